use ndarray::Array2;
use rand::random_range;
use tracing::info;

use crate::daq::{DEFAULT_SAMPLES_PER_CHANNEL, DaqError, DaqHardware};
use crate::plan::{AcquisitionPlan, ChannelSpec, SamplingSpec};

/// Simulated device backend: random samples inside each channel's configured
/// range, paced at the configured sample rate.
#[derive(Debug, Default)]
pub struct SimDaq {
    channels: Vec<ChannelSpec>,
    sampling: Option<SamplingSpec>,
    started: bool,
}

impl SimDaq {
    pub fn new() -> Self {
        Self::default()
    }

    fn samples_per_channel(&self) -> usize {
        self.sampling
            .map_or(DEFAULT_SAMPLES_PER_CHANNEL, |s| s.samples_per_channel) as usize
    }
}

impl DaqHardware for SimDaq {
    fn initialize(&mut self, plan: &AcquisitionPlan) -> Result<(), DaqError> {
        for channel in &plan.channels {
            info!(
                "sim: creating {:?} channel {}",
                channel.measurement, channel.physical_channel
            );
        }
        self.channels = plan.channels.clone();
        self.sampling = plan.sampling;
        Ok(())
    }

    fn channel_names(&mut self) -> Result<String, DaqError> {
        Ok(self
            .channels
            .iter()
            .map(|c| c.physical_channel.as_str())
            .collect::<Vec<_>>()
            .join(", "))
    }

    fn start(&mut self) -> Result<(), DaqError> {
        // The real driver refuses to start a task without channels.
        if self.channels.is_empty() {
            return Err(DaqError::Device("task has no channels".into()));
        }
        self.started = true;
        Ok(())
    }

    fn read_block(&mut self) -> Result<Array2<f64>, DaqError> {
        if !self.started {
            return Err(DaqError::Device("task not started".into()));
        }

        let samples = self.samples_per_channel();
        if let Some(sampling) = self.sampling {
            let block_duration = samples as f64 / sampling.rate;
            std::thread::sleep(std::time::Duration::from_secs_f64(block_duration));
        }

        let mut block = Array2::zeros((self.channels.len(), samples));
        for (row, channel) in self.channels.iter().enumerate() {
            for sample in 0..samples {
                block[[row, sample]] = random_range(channel.min..=channel.max);
            }
        }
        Ok(block)
    }
}
