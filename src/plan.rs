use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::config::ConfigMapping;

/// Channel and task sections are recognized by these keywords appearing
/// anywhere in the section name.
pub const CHANNEL_SECTION_KEYWORD: &str = "DAQmxChannel";
pub const TASK_SECTION_KEYWORD: &str = "DAQmxTask";

/// Keys of measurement-specific parameters carried in [`ChannelSpec::extra`].
pub const ACCEL_SENSITIVITY_KEY: &str = "AI.Accel.Sensitivity";
pub const SHUNT_RESISTANCE_KEY: &str = "AI.CurrentShunt.Resistance";

#[derive(Error, Debug, PartialEq)]
pub enum ResolveError {
    #[error("section [{section}] is missing required key {key:?}")]
    MissingField { section: String, key: &'static str },

    #[error("section [{section}] key {key:?}: {value:?} is not a valid value")]
    InvalidNumericField {
        section: String,
        key: &'static str,
        value: String,
    },

    #[error("section [{section}]: AI.Min {min} must be below AI.Max {max}")]
    InvalidRange {
        section: String,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    AnalogInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementType {
    Voltage,
    Current,
    Accelerometer,
}

/// One analog input channel to create on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpec {
    pub physical_channel: String,
    pub kind: ChannelKind,
    pub measurement: MeasurementType,
    pub min: f64,
    pub max: f64,
    /// Measurement-specific parameters, e.g. accelerometer sensitivity or the
    /// external shunt resistance of a current channel.
    pub extra: BTreeMap<&'static str, f64>,
}

/// Resolved sample clock configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingSpec {
    pub rate: f64,
    pub samples_per_channel: u64,
}

/// Everything the device-control backend needs: the channels to create and,
/// when a task section was present, the sample clock configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionPlan {
    pub channels: Vec<ChannelSpec>,
    pub sampling: Option<SamplingSpec>,
}

/// All section names containing `keyword` as a substring, in mapping order.
pub fn select_sections<'a>(mapping: &'a ConfigMapping, keyword: &str) -> Vec<&'a str> {
    mapping
        .keys()
        .filter(|name| name.contains(keyword))
        .map(String::as_str)
        .collect()
}

fn field<'a>(
    section: &str,
    entries: &'a BTreeMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ResolveError> {
    entries
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ResolveError::MissingField {
            section: section.to_owned(),
            key,
        })
}

fn numeric_field(
    section: &str,
    entries: &BTreeMap<String, String>,
    key: &'static str,
) -> Result<f64, ResolveError> {
    let value = field(section, entries, key)?;
    value
        .trim()
        .parse()
        .map_err(|_| ResolveError::InvalidNumericField {
            section: section.to_owned(),
            key,
            value: value.to_owned(),
        })
}

/// Resolve one channel section into a [`ChannelSpec`].
///
/// Unrecognized `ChanType` or `AI.MeasType` values yield `Ok(None)` rather
/// than an error: configuration files may describe channel types this build
/// does not support, and those sections are deliberately skipped.
pub fn resolve_channel(
    name: &str,
    entries: &BTreeMap<String, String>,
) -> Result<Option<ChannelSpec>, ResolveError> {
    let chan_type = field(name, entries, "ChanType")?;
    if chan_type != "Analog Input" {
        debug!("skipping section [{name}]: unsupported channel type {chan_type:?}");
        return Ok(None);
    }

    let physical_channel = field(name, entries, "PhysicalChanName")?.to_owned();
    let min = numeric_field(name, entries, "AI.Min")?;
    let max = numeric_field(name, entries, "AI.Max")?;
    // Written as a negated less-than so NaN bounds fail the invariant too.
    if !(min < max) {
        return Err(ResolveError::InvalidRange {
            section: name.to_owned(),
            min,
            max,
        });
    }

    let meas_type = field(name, entries, "AI.MeasType")?;
    let measurement = match meas_type {
        "Voltage" => MeasurementType::Voltage,
        "Current" => MeasurementType::Current,
        "Accelerometer" => MeasurementType::Accelerometer,
        other => {
            debug!("skipping section [{name}]: unsupported measurement type {other:?}");
            return Ok(None);
        }
    };

    let mut extra = BTreeMap::new();
    match measurement {
        MeasurementType::Voltage => {}
        MeasurementType::Current => {
            if entries.contains_key(SHUNT_RESISTANCE_KEY) {
                extra.insert(
                    SHUNT_RESISTANCE_KEY,
                    numeric_field(name, entries, SHUNT_RESISTANCE_KEY)?,
                );
            }
        }
        MeasurementType::Accelerometer => {
            extra.insert(
                ACCEL_SENSITIVITY_KEY,
                numeric_field(name, entries, ACCEL_SENSITIVITY_KEY)?,
            );
        }
    }

    Ok(Some(ChannelSpec {
        physical_channel,
        kind: ChannelKind::AnalogInput,
        measurement,
        min,
        max,
        extra,
    }))
}

/// Resolve the sample clock configuration, falling back to `default` when no
/// task section exists.
pub fn resolve_sampling(
    mapping: &ConfigMapping,
    default: SamplingSpec,
) -> Result<SamplingSpec, ResolveError> {
    Ok(task_section_sampling(mapping)?.unwrap_or(default))
}

fn task_section_sampling(mapping: &ConfigMapping) -> Result<Option<SamplingSpec>, ResolveError> {
    // Only the first matching section is honored; further task sections are
    // ignored. Documented behavior, do not silently fix.
    let Some(name) = select_sections(mapping, TASK_SECTION_KEYWORD).into_iter().next() else {
        return Ok(None);
    };
    let entries = &mapping[name];

    let rate = numeric_field(name, entries, "SampClk.Rate")?;
    if !(rate > 0.0) {
        return Err(ResolveError::InvalidNumericField {
            section: name.to_owned(),
            key: "SampClk.Rate",
            value: entries["SampClk.Rate"].clone(),
        });
    }

    let raw_samples = field(name, entries, "SampQuant.SampPerChan")?;
    // The driver API takes the per-channel read count as an int32, so values
    // beyond that are rejected here rather than truncated later.
    let samples_per_channel = raw_samples
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|&n| n > 0 && n <= i32::MAX as u64)
        .ok_or_else(|| ResolveError::InvalidNumericField {
            section: name.to_owned(),
            key: "SampQuant.SampPerChan",
            value: raw_samples.to_owned(),
        })?;

    Ok(Some(SamplingSpec {
        rate,
        samples_per_channel,
    }))
}

/// Single pass over the configuration: every channel section becomes a
/// [`ChannelSpec`] (or is skipped), and the task section, if any, becomes the
/// sampling configuration.
pub fn resolve_plan(mapping: &ConfigMapping) -> Result<AcquisitionPlan, ResolveError> {
    let mut channels = Vec::new();
    for name in select_sections(mapping, CHANNEL_SECTION_KEYWORD) {
        if let Some(spec) = resolve_channel(name, &mapping[name])? {
            channels.push(spec);
        }
    }
    let sampling = task_section_sampling(mapping)?;
    Ok(AcquisitionPlan { channels, sampling })
}
