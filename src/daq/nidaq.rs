use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::Duration;
use ndarray::Array2;
use tracing::{error, info, warn};

use crate::daq::bindings::*;
use crate::daq::{DEFAULT_SAMPLES_PER_CHANNEL, DaqError, DaqHardware};
use crate::plan::{
    ACCEL_SENSITIVITY_KEY, AcquisitionPlan, ChannelSpec, MeasurementType, SHUNT_RESISTANCE_KEY,
};

/// Timeout for a single blocking device read.
const READ_TIMEOUT: Duration = Duration::seconds(10);
/// DAQmx default external shunt resistance, ohm.
const DEFAULT_SHUNT_RESISTANCE: f64 = 249.0;
/// Excitation current for IEPE accelerometers, ampere.
const ACCEL_EXCITATION_CURRENT: f64 = 0.004;

/// Owns the DAQmx task handle and clears the task on drop, so the device
/// resource is released on every exit path.
#[derive(Debug)]
struct TaskHandleWrapper {
    inner: TaskHandle,
}

impl Drop for TaskHandleWrapper {
    fn drop(&mut self) {
        unsafe {
            DAQmxClearTask(self.inner);
        }
    }
}

unsafe impl Send for TaskHandleWrapper {}

/// NI-DAQmx backed device control.
#[derive(Debug)]
pub struct Nidaq {
    task: Option<TaskHandleWrapper>,
    channel_count: usize,
    samples_per_channel: u64,
}

impl Nidaq {
    pub fn new() -> Self {
        Self {
            task: None,
            channel_count: 0,
            samples_per_channel: DEFAULT_SAMPLES_PER_CHANNEL,
        }
    }

    fn task(&self) -> Result<&TaskHandleWrapper, DaqError> {
        self.task
            .as_ref()
            .ok_or_else(|| DaqError::Device("task not initialized".into()))
    }
}

impl Default for Nidaq {
    fn default() -> Self {
        Self::new()
    }
}

fn create_channel(task: &TaskHandleWrapper, spec: &ChannelSpec) -> Result<(), DaqError> {
    info!(
        "creating {:?} channel {}",
        spec.measurement, spec.physical_channel
    );
    let physical = CString::new(spec.physical_channel.as_str())?;

    let err = match spec.measurement {
        MeasurementType::Voltage => unsafe {
            DAQmxCreateAIVoltageChan(
                task.inner,
                physical.as_ptr(),
                ptr::null(),
                DAQmx_Val_Cfg_Default,
                spec.min,
                spec.max,
                DAQmx_Val_Volts,
                ptr::null(),
            )
        },
        MeasurementType::Current => {
            let shunt = spec
                .extra
                .get(SHUNT_RESISTANCE_KEY)
                .copied()
                .unwrap_or(DEFAULT_SHUNT_RESISTANCE);
            unsafe {
                DAQmxCreateAICurrentChan(
                    task.inner,
                    physical.as_ptr(),
                    ptr::null(),
                    DAQmx_Val_Cfg_Default,
                    spec.min,
                    spec.max,
                    DAQmx_Val_Amps,
                    DAQmx_Val_Internal,
                    shunt,
                    ptr::null(),
                )
            }
        }
        MeasurementType::Accelerometer => {
            let sensitivity = spec.extra.get(ACCEL_SENSITIVITY_KEY).copied().ok_or_else(|| {
                DaqError::Device(format!(
                    "accelerometer channel {} has no sensitivity",
                    spec.physical_channel
                ))
            })?;
            unsafe {
                DAQmxCreateAIAccelChan(
                    task.inner,
                    physical.as_ptr(),
                    ptr::null(),
                    DAQmx_Val_PseudoDiff,
                    spec.min,
                    spec.max,
                    DAQmx_Val_AccelUnit_g,
                    sensitivity,
                    DAQmx_Val_mVoltsPerG,
                    DAQmx_Val_Internal,
                    ACCEL_EXCITATION_CURRENT,
                    ptr::null(),
                )
            }
        }
    };
    check_err(err)
}

impl DaqHardware for Nidaq {
    fn initialize(&mut self, plan: &AcquisitionPlan) -> Result<(), DaqError> {
        info!("creating DAQmx task");
        let task_name = CString::new("")?;
        let mut handle: TaskHandle = ptr::null_mut();
        unsafe {
            check_err(DAQmxCreateTask(task_name.as_ptr(), &mut handle))?;
        }
        let task = TaskHandleWrapper { inner: handle };

        for spec in &plan.channels {
            create_channel(&task, spec)?;
        }

        if let Some(sampling) = plan.sampling {
            info!(
                "configuring sample clock: {} S/s, {} samples per channel",
                sampling.rate, sampling.samples_per_channel
            );
            unsafe {
                check_err(DAQmxCfgSampClkTiming(
                    task.inner,
                    ptr::null(),
                    sampling.rate,
                    DAQmx_Val_Rising,
                    DAQmx_Val_ContSamps,
                    sampling.samples_per_channel,
                ))?;
            }
            self.samples_per_channel = sampling.samples_per_channel;
        }

        self.channel_count = plan.channels.len();
        self.task = Some(task);
        Ok(())
    }

    fn channel_names(&mut self) -> Result<String, DaqError> {
        let task = self.task()?;
        let mut buf = [0 as c_char; 2048];
        unsafe {
            check_err(DAQmxGetTaskChannels(
                task.inner,
                buf.as_mut_ptr(),
                buf.len() as u32,
            ))?;
        }
        let names = unsafe { CStr::from_ptr(buf.as_ptr()) };
        Ok(names.to_string_lossy().into_owned())
    }

    fn start(&mut self) -> Result<(), DaqError> {
        info!("starting DAQmx task");
        unsafe { check_err(DAQmxStartTask(self.task()?.inner)) }
    }

    fn read_block(&mut self) -> Result<Array2<f64>, DaqError> {
        let task = self.task()?;
        let samples = self.samples_per_channel as usize;

        // Buffer sized from the resolved channel count, not a fixed guess.
        let mut raw = vec![0.0f64; self.channel_count * samples];
        let num_samps: i32 = self
            .samples_per_channel
            .try_into()
            .map_err(|_| DaqError::Device("samples per channel exceeds driver limits".into()))?;
        let array_size: u32 = raw
            .len()
            .try_into()
            .map_err(|_| DaqError::Device("read buffer exceeds driver limits".into()))?;
        let mut read_per_channel: i32 = 0;
        unsafe {
            check_err(DAQmxReadAnalogF64(
                task.inner,
                num_samps,
                READ_TIMEOUT.as_seconds_f64(),
                DAQmx_Val_GroupByChannel,
                raw.as_mut_ptr(),
                array_size,
                &mut read_per_channel,
                ptr::null_mut(),
            ))?;
        }

        // Grouped by channel, the driver packs each channel's samples
        // contiguously using the actual per-channel read count.
        let read = read_per_channel.max(0) as usize;
        raw.truncate(self.channel_count * read);
        Array2::from_shape_vec((self.channel_count, read), raw)
            .map_err(|e| DaqError::Device(e.to_string()))
    }
}

fn check_err(err: i32) -> Result<(), DaqError> {
    if err == 0 {
        return Ok(());
    }

    let mut buf = [0 as c_char; 2048];
    unsafe {
        DAQmxGetExtendedErrorInfo(buf.as_mut_ptr(), buf.len() as u32);
    }
    let message = unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned();

    if err < 0 {
        error!("DAQmx error {err}: {message}");
        return Err(DaqError::Device(message));
    }
    warn!("DAQmx warning {err}: {message}");
    Ok(())
}
