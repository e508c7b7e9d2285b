use clap::Parser;
use kafka_push_proxy::kafka::KafkaProducerFactory;
use kafka_push_proxy::lock::InProcessLock;
use kafka_push_proxy::message::PARTITION_UNASSIGNED;
use kafka_push_proxy::{Config, Error, Message, ProducerRegistry, Publisher, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "kafka-push-proxy")]
#[command(about = "Publish messages to Kafka through the pooled push proxy", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[arg(short, long, help = "Target topic")]
    topic: String,

    #[arg(short, long, default_value_t = PARTITION_UNASSIGNED, help = "Target partition, negative for broker-assigned")]
    partition: i32,

    #[arg(short, long, help = "Record key, generated when omitted")]
    key: Option<String>,

    #[arg(required = true, help = "Message bodies, one message per argument")]
    bodies: Vec<String>,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    info!("Starting kafka-push-proxy");
    info!("Loading configuration from {:?}", args.config);

    let config = match Config::from_file(&args.config) {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(Error::Config(e));
        }
    };

    info!(
        kafka_brokers = ?config.kafka.brokers,
        kafka_acks = %config.kafka.acks,
        repush_times = config.retry.repush_times,
        reconsume_times = config.retry.reconsume_times,
        "Configuration summary"
    );

    let factory = Arc::new(KafkaProducerFactory::new(config.kafka.clone()));
    let lock = Arc::new(InProcessLock::new());
    let registry = Arc::new(ProducerRegistry::new(factory, lock));
    let publisher = Publisher::new(registry, config.retry.clone());

    let messages: Vec<Message> = args
        .bodies
        .iter()
        .map(|body| {
            let mut message =
                Message::new(args.topic.clone(), body.clone().into_bytes()).with_partition(args.partition);
            if let Some(key) = &args.key {
                message = message.with_key(key.clone());
            }
            message
        })
        .collect();

    let handles = publisher.push_message(&messages).await?;
    for handle in &handles {
        info!(
            topic = %handle.topic,
            key = %handle.key,
            partition = handle.partition,
            offset = handle.offset,
            "published"
        );
    }

    Ok(())
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("kafka_push_proxy=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("kafka_push_proxy=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
