use ndarray::Array2;
use thiserror::Error;
use tracing::info;

use crate::plan::AcquisitionPlan;

#[cfg(feature = "nidaq")]
pub mod bindings;
#[cfg(feature = "nidaq")]
pub mod nidaq;
#[cfg(feature = "sim")]
pub mod sim;

/// Samples per channel to request when no task section configured timing.
pub(crate) const DEFAULT_SAMPLES_PER_CHANNEL: u64 = 1000;

#[derive(Error, Debug)]
pub enum DaqError {
    #[error("device error: {0}")]
    Device(String),

    #[error("channel name contains an interior NUL byte: {0}")]
    ChannelName(#[from] std::ffi::NulError),
}

/// Device-control surface backing the acquisition loop. The NI-DAQmx backend
/// implements this against the vendor C API; the sim backend fakes the device
/// for machines without the driver.
pub trait DaqHardware {
    /// Create the device task and one virtual channel per spec, and configure
    /// sample clock timing when the plan carries a sampling configuration.
    fn initialize(&mut self, plan: &AcquisitionPlan) -> Result<(), DaqError>;

    /// Names of the virtual channels in the task, in creation order.
    fn channel_names(&mut self) -> Result<String, DaqError>;

    fn start(&mut self) -> Result<(), DaqError>;

    /// Blocking read of one block of samples, shaped (channels, samples).
    fn read_block(&mut self) -> Result<Array2<f64>, DaqError>;
}

/// Configure the device from the plan and stream sample blocks to stdout
/// until the process is interrupted or the device reports a failure.
pub fn run_acquisition(
    hardware: &mut impl DaqHardware,
    plan: &AcquisitionPlan,
) -> Result<(), DaqError> {
    hardware.initialize(plan)?;
    info!("channels in task: {}", hardware.channel_names()?);
    hardware.start()?;
    info!("acquiring, press Ctrl+C to stop");

    loop {
        let block = hardware.read_block()?;
        report_block(&block);
    }
}

fn report_block(block: &Array2<f64>) {
    println!("read {} samples per channel:", block.ncols());
    for row in block.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.6}")).collect();
        println!("{}", line.join(" "));
    }
}
