//! Listeners that call back into the device while being notified.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{GOOD_SCAN, finger};
use fprint_biometric::MinutiaeEngine;
use fprint_core::{AcquireState, Action, EnrollResult};
use fprint_hardware::mock::MockSensor;
use fprint_hardware::types::DriverInfo;
use fprint_hardware::{DriverConfig, ImageDriver, callback_channel};
use fprint_imgdev::{DeviceEvent, DeviceRunner, ImgDevice};
use tokio::sync::mpsc;

type Log = Arc<Mutex<Vec<String>>>;

fn engine() -> Box<MinutiaeEngine> {
    Box::new(MinutiaeEngine::default())
}

#[test]
fn test_stop_from_started_skips_finger_wait() {
    let (callbacks, receiver) = callback_channel();
    let (driver, _sensor) = MockSensor::new(callbacks);
    let log: Log = Arc::default();
    let sink = log.clone();

    let listener = move |device: &mut ImgDevice, event: DeviceEvent| {
        if let DeviceEvent::Started { .. } = event {
            device.enroll_stop().unwrap();
        }
        sink.lock().unwrap().push(event.name().to_string());
    };

    let device = ImgDevice::open(driver, engine(), listener, 0).unwrap();
    let mut runner = DeviceRunner::new(device, receiver);
    runner.pump().unwrap();

    runner.device_mut().enroll_start().unwrap();
    runner.pump().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["open-complete", "started", "stopped"]
    );
    let device = runner.device();
    assert_eq!(device.action(), Action::None);
    assert_eq!(device.acquire_state(), AcquireState::Idle);
    assert!(
        device
            .history()
            .all(|t| t.to != AcquireState::AwaitFingerOn)
    );
}

#[test]
fn test_stop_from_pass_prevents_rearm() {
    let (callbacks, receiver) = callback_channel();
    let (driver, sensor) = MockSensor::new(callbacks);

    let listener = move |device: &mut ImgDevice, event: DeviceEvent| {
        if let DeviceEvent::EnrollStageCompleted {
            result: Ok(EnrollResult::Pass),
            ..
        } = event
        {
            device.enroll_stop().unwrap();
        }
    };

    let device = ImgDevice::open(driver, engine(), listener, 0).unwrap();
    let mut runner = DeviceRunner::new(device, receiver);
    runner.pump().unwrap();
    runner.device_mut().enroll_start().unwrap();
    runner.pump().unwrap();

    sensor.scan(finger(GOOD_SCAN, 0)).unwrap();
    runner.pump().unwrap();

    assert_eq!(runner.device().action(), Action::None);
    assert_eq!(runner.device().acquire_state(), AcquireState::Idle);
    assert_eq!(runner.device().session().enroll_stage(), 0);
}

#[test]
fn test_restart_from_stopped() {
    let (callbacks, receiver) = callback_channel();
    let (driver, sensor) = MockSensor::new(callbacks);
    let log: Log = Arc::default();
    let sink = log.clone();

    let listener = move |device: &mut ImgDevice, event: DeviceEvent| {
        match &event {
            DeviceEvent::CaptureResult { .. } => device.capture_stop().unwrap(),
            DeviceEvent::Stopped {
                action: Action::Capture,
            } => device.enroll_start().unwrap(),
            _ => {}
        }
        sink.lock().unwrap().push(event.name().to_string());
    };

    let device = ImgDevice::open(driver, engine(), listener, 0).unwrap();
    let mut runner = DeviceRunner::new(device, receiver);
    runner.pump().unwrap();
    runner.device_mut().capture_start(false).unwrap();
    runner.pump().unwrap();

    sensor.scan(finger(GOOD_SCAN, 0)).unwrap();
    runner.pump().unwrap();

    assert_eq!(runner.device().action(), Action::Enroll);
    assert_eq!(runner.device().acquire_state(), AcquireState::AwaitFingerOn);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "open-complete",
            "started",
            "capture-result",
            "stopped",
            "started"
        ]
    );
}

#[test]
fn test_events_raised_in_listener_are_queued() {
    let driver = ImageDriver::builder(DriverInfo::new("bare", "Bare Sensor"))
        .config(DriverConfig::default())
        .build()
        .unwrap();
    let log: Log = Arc::default();
    let sink = log.clone();

    let listener = move |device: &mut ImgDevice, event: DeviceEvent| {
        sink.lock().unwrap().push(format!("enter {}", event.name()));
        if let DeviceEvent::OpenComplete(Ok(())) = event {
            device.close().unwrap();
        }
        sink.lock().unwrap().push(format!("leave {}", event.name()));
    };

    let device = ImgDevice::open(driver, engine(), listener, 0).unwrap();
    assert!(device.is_closed());
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "enter open-complete",
            "leave open-complete",
            "enter close-complete",
            "leave close-complete"
        ]
    );
}

#[tokio::test]
async fn test_runner_task_drives_device_to_close() {
    let (callbacks, receiver) = callback_channel();
    let (driver, sensor) = MockSensor::new(callbacks);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let listener = move |device: &mut ImgDevice, event: DeviceEvent| {
        match &event {
            DeviceEvent::OpenComplete(Ok(())) => device.capture_start(false).unwrap(),
            DeviceEvent::CaptureResult { .. } => device.capture_stop().unwrap(),
            DeviceEvent::Stopped { .. } => device.close().unwrap(),
            _ => {}
        }
        let _ = tx.send(event.name());
    };

    let device = ImgDevice::open(driver, engine(), listener, 0).unwrap();
    let task = tokio::spawn(DeviceRunner::new(device, receiver).run());

    while let Some(name) = rx.recv().await {
        if name == "started" {
            break;
        }
    }
    sensor.scan(finger(GOOD_SCAN, 0)).unwrap();

    let device = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("runner finishes")
        .unwrap()
        .unwrap();
    assert!(device.is_closed());

    let mut names = Vec::new();
    while let Ok(name) = rx.try_recv() {
        names.push(name);
    }
    assert_eq!(names, vec!["capture-result", "stopped", "close-complete"]);
}
