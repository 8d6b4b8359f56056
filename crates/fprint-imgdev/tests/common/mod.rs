//! Common test utilities for imaging device integration tests.
//!
//! A [`Harness`] wires an [`ImgDevice`] to a mock sensor and collects the
//! events it delivers, so tests can script touches and inspect results
//! without dealing with channels.

#![allow(dead_code)]

use fprint_biometric::{MinutiaeEngine, PrintData, synthetic};
use fprint_core::Action;
use fprint_hardware::mock::{MockSensor, MockSensorHandle};
use fprint_hardware::{DriverConfig, Image, callback_channel};
use fprint_imgdev::{ChannelListener, DeviceEvent, DeviceRunner, ImgDevice};
use tokio::sync::mpsc::UnboundedReceiver;

/// Side of the synthetic finger images.
pub const IMAGE_SIZE: u32 = 64;

/// Segments giving a scan with enough minutiae (12).
pub const GOOD_SCAN: usize = 6;

/// Segments giving a scan below the minutiae minimum (8).
pub const POOR_SCAN: usize = 4;

/// Synthetic finger image.
pub fn finger(segments: usize, variant: u32) -> Image {
    synthetic::finger(IMAGE_SIZE, IMAGE_SIZE, segments, variant)
}

pub struct Harness {
    pub runner: DeviceRunner,
    pub sensor: MockSensorHandle,
    pub events: UnboundedReceiver<DeviceEvent>,
}

impl Harness {
    /// Open a mock device with default configuration.
    pub fn open() -> Self {
        Self::open_with(DriverConfig::default())
    }

    /// Open a mock device and consume its `OpenComplete`.
    pub fn open_with(config: DriverConfig) -> Self {
        let (callbacks, receiver) = callback_channel();
        let (driver, sensor) = MockSensor::with_config(config, callbacks);
        let (listener, events) = ChannelListener::new();

        let device = ImgDevice::open(driver, Box::new(MinutiaeEngine::default()), listener, 0)
            .expect("mock device opens");
        let mut harness = Self {
            runner: DeviceRunner::new(device, receiver),
            sensor,
            events,
        };

        assert_eq!(harness.settle(), vec![DeviceEvent::OpenComplete(Ok(()))]);
        harness
    }

    pub fn device(&mut self) -> &mut ImgDevice {
        self.runner.device_mut()
    }

    /// Apply all queued driver callbacks and return the delivered events.
    pub fn settle(&mut self) -> Vec<DeviceEvent> {
        self.runner.pump().expect("callbacks apply cleanly");
        let mut delivered = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            delivered.push(event);
        }
        delivered
    }

    /// Complete a start request and check the `Started` event.
    pub fn expect_started(&mut self, action: Action) {
        assert_eq!(
            self.settle(),
            vec![DeviceEvent::Started {
                action,
                status: Ok(())
            }]
        );
    }

    pub fn start_enroll(&mut self) {
        self.device().enroll_start().expect("enroll starts");
        self.expect_started(Action::Enroll);
    }

    pub fn start_verify(&mut self, reference: PrintData) {
        self.device().verify_start(reference).expect("verify starts");
        self.expect_started(Action::Verify);
    }

    pub fn start_identify(&mut self, gallery: Vec<PrintData>) {
        self.device()
            .identify_start(gallery)
            .expect("identify starts");
        self.expect_started(Action::Identify);
    }

    /// Full touch with the given image, returning the delivered events.
    pub fn touch(&mut self, image: Image) -> Vec<DeviceEvent> {
        self.sensor.scan(image).expect("sensor channel open");
        self.settle()
    }

    /// Run a complete enrollment with good scans of `variant`.
    pub fn enroll(&mut self, variant: u32) -> PrintData {
        self.start_enroll();
        let stages = self.device().enroll_stages();

        let mut template = None;
        for _ in 0..stages {
            for event in self.touch(finger(GOOD_SCAN, variant)) {
                if let DeviceEvent::EnrollStageCompleted { print: Some(p), .. } = event {
                    template = Some(p);
                }
            }
        }

        self.stop(Action::Enroll);
        template.expect("enrollment completed")
    }

    /// Stop `action` and check the `Stopped` event.
    pub fn stop(&mut self, action: Action) {
        let device = self.device();
        match action {
            Action::Enroll => device.enroll_stop(),
            Action::Verify => device.verify_stop(),
            Action::Identify => device.identify_stop(),
            Action::Capture => device.capture_stop(),
            Action::None => panic!("nothing to stop"),
        }
        .expect("stop accepted");

        assert_eq!(self.settle(), vec![DeviceEvent::Stopped { action }]);
    }
}
