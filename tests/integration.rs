use daqstream::config;
use daqstream::plan::{MeasurementType, SamplingSpec, resolve_plan};

const CONFIG: &str = "\
; two channels, one of which this build does not support
[DAQmxChannel0]
ChanType = Analog Input
PhysicalChanName = Dev1/ai0
AI.MeasType = Voltage
AI.Min = -10
AI.Max = 10

[DAQmxChannel1]
ChanType = Analog Input
PhysicalChanName = Dev1/ai1
AI.MeasType = Thermocouple
AI.Min = 0
AI.Max = 100

[DAQmxTask]
SampClk.Rate = 1000
SampQuant.SampPerChan = 100
";

fn load_fixture() -> config::ConfigMapping {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.ini");
    std::fs::write(&path, CONFIG).unwrap();
    config::load(&path).unwrap()
}

#[test]
fn resolves_plan_from_config_file() {
    let plan = resolve_plan(&load_fixture()).unwrap();

    // The thermocouple section is skipped, not an error.
    assert_eq!(plan.channels.len(), 1);
    let channel = &plan.channels[0];
    assert_eq!(channel.physical_channel, "Dev1/ai0");
    assert_eq!(channel.measurement, MeasurementType::Voltage);
    assert_eq!(channel.min, -10.0);
    assert_eq!(channel.max, 10.0);

    assert_eq!(
        plan.sampling,
        Some(SamplingSpec {
            rate: 1000.0,
            samples_per_channel: 100,
        })
    );
}

#[cfg(feature = "sim")]
#[test]
fn sim_backend_streams_blocks_matching_the_plan() {
    use daqstream::daq::{DaqHardware, sim::SimDaq};

    let plan = resolve_plan(&load_fixture()).unwrap();
    let mut hardware = SimDaq::new();
    hardware.initialize(&plan).unwrap();
    assert_eq!(hardware.channel_names().unwrap(), "Dev1/ai0");
    hardware.start().unwrap();

    let block = hardware.read_block().unwrap();
    assert_eq!(block.dim(), (1, 100));
    assert!(block.iter().all(|v| (-10.0..=10.0).contains(v)));
}

#[cfg(feature = "sim")]
#[test]
fn sim_backend_refuses_to_start_an_empty_task() {
    use daqstream::daq::{DaqHardware, sim::SimDaq};
    use daqstream::plan::AcquisitionPlan;

    let plan = AcquisitionPlan {
        channels: Vec::new(),
        sampling: None,
    };
    let mut hardware = SimDaq::new();
    hardware.initialize(&plan).unwrap();
    assert!(hardware.start().is_err());
}
