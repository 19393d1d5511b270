//! Hand-maintained declarations for the subset of the NI-DAQmx C API this
//! crate calls. Types follow the NIDAQmx.h typedefs: int32 -> i32,
//! uInt32 -> u32, uInt64 -> u64, bool32 -> u32, float64 -> f64.

#![allow(non_snake_case, non_upper_case_globals)]

use std::os::raw::{c_char, c_void};

pub type TaskHandle = *mut c_void;

pub const DAQmx_Val_Cfg_Default: i32 = -1;
pub const DAQmx_Val_Volts: i32 = 10348;
pub const DAQmx_Val_Amps: i32 = 10342;
pub const DAQmx_Val_AccelUnit_g: i32 = 10186;
pub const DAQmx_Val_mVoltsPerG: i32 = 12509;
pub const DAQmx_Val_PseudoDiff: i32 = 12529;
pub const DAQmx_Val_Internal: i32 = 10200;
pub const DAQmx_Val_Rising: i32 = 10280;
pub const DAQmx_Val_ContSamps: i32 = 10123;
pub const DAQmx_Val_GroupByChannel: u32 = 0;

unsafe extern "C" {
    pub fn DAQmxCreateTask(taskName: *const c_char, taskHandle: *mut TaskHandle) -> i32;

    pub fn DAQmxCreateAIVoltageChan(
        taskHandle: TaskHandle,
        physicalChannel: *const c_char,
        nameToAssignToChannel: *const c_char,
        terminalConfig: i32,
        minVal: f64,
        maxVal: f64,
        units: i32,
        customScaleName: *const c_char,
    ) -> i32;

    pub fn DAQmxCreateAICurrentChan(
        taskHandle: TaskHandle,
        physicalChannel: *const c_char,
        nameToAssignToChannel: *const c_char,
        terminalConfig: i32,
        minVal: f64,
        maxVal: f64,
        units: i32,
        shuntResistorLoc: i32,
        extShuntResistorVal: f64,
        customScaleName: *const c_char,
    ) -> i32;

    pub fn DAQmxCreateAIAccelChan(
        taskHandle: TaskHandle,
        physicalChannel: *const c_char,
        nameToAssignToChannel: *const c_char,
        terminalConfig: i32,
        minVal: f64,
        maxVal: f64,
        units: i32,
        sensitivity: f64,
        sensitivityUnits: i32,
        currentExcitSource: i32,
        currentExcitVal: f64,
        customScaleName: *const c_char,
    ) -> i32;

    pub fn DAQmxCfgSampClkTiming(
        taskHandle: TaskHandle,
        source: *const c_char,
        rate: f64,
        activeEdge: i32,
        sampleMode: i32,
        sampsPerChanToAcquire: u64,
    ) -> i32;

    pub fn DAQmxGetTaskChannels(taskHandle: TaskHandle, data: *mut c_char, bufferSize: u32) -> i32;

    pub fn DAQmxStartTask(taskHandle: TaskHandle) -> i32;

    pub fn DAQmxClearTask(taskHandle: TaskHandle) -> i32;

    pub fn DAQmxReadAnalogF64(
        taskHandle: TaskHandle,
        numSampsPerChan: i32,
        timeout: f64,
        fillMode: u32,
        readArray: *mut f64,
        arraySizeInSamps: u32,
        sampsPerChanRead: *mut i32,
        reserved: *mut u32,
    ) -> i32;

    pub fn DAQmxGetExtendedErrorInfo(errorString: *mut c_char, bufferSize: u32) -> i32;
}
