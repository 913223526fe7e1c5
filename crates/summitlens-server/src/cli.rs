use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "summitlens-server")]
#[command(author, version, about = "SummitLens mountain landmark inference server", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", env = "SUMMITLENS_CONFIG")]
    pub config: String,

    /// Local model weights (safetensors), overrides the configured source
    #[arg(short, long, env = "SUMMITLENS_MODEL")]
    pub model: Option<String>,

    /// Minimum confidence required to report a landmark
    #[arg(short, long, env = "SUMMITLENS_THRESHOLD")]
    pub threshold: Option<f32>,

    /// Listen address
    #[arg(short = 'l', long, env = "SUMMITLENS_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "SUMMITLENS_PORT")]
    pub port: Option<u16>,

    /// Classifier timeout in milliseconds
    #[arg(long, env = "SUMMITLENS_INFERENCE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
