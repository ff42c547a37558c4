//! GCodeWarp command-line interface.

use std::path::PathBuf;

use clap::Parser;
use gcodewarp::{init_logging, process_file, ModulationConfig, WaveDirection, Waveform};

#[derive(Parser)]
#[command(name = "gcodewarp", version)]
#[command(about = "Add non-planar Z-modulation to sliced G-code", long_about = None)]
struct Cli {
    /// The input G-code file
    input_file: PathBuf,

    /// Write the result here instead of rewriting the input in place
    #[arg(long)]
    output: Option<PathBuf>,

    /// Apply modulation to sparse infill
    #[arg(long)]
    include_infill: bool,

    /// Apply modulation to internal perimeters
    #[arg(long)]
    include_perimeters: bool,

    /// Apply modulation to external perimeters
    #[arg(long)]
    include_external_perimeters: bool,

    /// Amplitude for wall modulation in mm
    #[arg(long, default_value_t = 0.3)]
    wall_amplitude: f64,

    /// Frequency for wall modulation in cycles per mm
    #[arg(long, default_value_t = 1.1)]
    wall_frequency: f64,

    /// Direction of the wave for walls
    #[arg(long, default_value_t = WaveDirection::X)]
    wall_direction: WaveDirection,

    /// Periodic function for wall modulation
    #[arg(long, default_value_t = Waveform::Sine)]
    perimeter_function: Waveform,

    /// Amplitude for infill modulation in mm
    #[arg(long, default_value_t = 0.3)]
    infill_amplitude: f64,

    /// Frequency for infill modulation in cycles per mm
    #[arg(long, default_value_t = 1.1)]
    infill_frequency: f64,

    /// Direction of the wave for infill
    #[arg(long, default_value_t = WaveDirection::X)]
    infill_direction: WaveDirection,

    /// Periodic function for infill modulation
    #[arg(long, default_value_t = Waveform::Sine)]
    infill_function: Waveform,

    /// Max amplitude change per layer as a fraction of the raw amplitude
    #[arg(long, default_value_t = 0.1)]
    max_step_size: f64,

    /// Phase-invert the wave on successive wall loops
    #[arg(long)]
    alternate_loops: bool,

    /// Maximum wave segment length in mm
    #[arg(long, default_value_t = 0.2)]
    resolution: f64,

    /// Layer height fallback in mm when the file does not reveal one
    #[arg(long, default_value_t = 0.2)]
    layer_height: f64,

    /// Solid-infill damping window in layers
    #[arg(long, default_value_t = 4.0)]
    falloff_layers: f64,
}

impl Cli {
    fn config(&self) -> ModulationConfig {
        let mut config = ModulationConfig::default();
        config.walls.amplitude = self.wall_amplitude;
        config.walls.frequency = self.wall_frequency;
        config.walls.direction = self.wall_direction;
        config.walls.function = self.perimeter_function;
        config.infill.amplitude = self.infill_amplitude;
        config.infill.frequency = self.infill_frequency;
        config.infill.direction = self.infill_direction;
        config.infill.function = self.infill_function;
        config.include_perimeters = self.include_perimeters;
        config.include_external_perimeters = self.include_external_perimeters;
        config.include_infill = self.include_infill;
        config.resolution = self.resolution;
        config.max_step_size = self.max_step_size;
        config.alternate_loops = self.alternate_loops;
        config.default_layer_height = self.layer_height;
        config.falloff_layers = self.falloff_layers;
        config
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let output = cli.output.clone().unwrap_or_else(|| cli.input_file.clone());
    process_file(&cli.input_file, &output, cli.config())?;

    Ok(())
}
