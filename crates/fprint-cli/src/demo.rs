//! Scripted sessions against the mock sensor.

use anyhow::{Context, Result, bail};
use fprint_biometric::{MinutiaeEngine, PrintData, synthetic};
use fprint_core::{CaptureResult, EnrollResult, VerifyResult};
use fprint_hardware::mock::{MockSensor, MockSensorHandle};
use fprint_hardware::{DriverConfig, Image, callback_channel};
use fprint_imgdev::{ChannelListener, DeviceEvent, DeviceRunner, ImgDevice};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

const IMAGE_SIZE: u32 = 64;

/// Upper bound on touches before a scripted session gives up.
const MAX_TOUCHES: usize = 64;

/// What a simulated finger looks like.
#[derive(Debug, Clone, Copy)]
pub struct Finger {
    pub segments: usize,
    pub variant: u32,
}

impl Finger {
    fn image(&self) -> Image {
        synthetic::finger(IMAGE_SIZE, IMAGE_SIZE, self.segments, self.variant)
    }
}

/// A mock device with its callback pump and event stream.
pub struct Demo {
    runner: DeviceRunner,
    sensor: MockSensorHandle,
    events: UnboundedReceiver<DeviceEvent>,
}

impl Demo {
    /// Open a mock device and wait for it to be ready.
    pub async fn open(config: DriverConfig) -> Result<Self> {
        let (callbacks, receiver) = callback_channel();
        let (driver, sensor) = MockSensor::with_config(config, callbacks);
        let (listener, events) = ChannelListener::new();

        let device = ImgDevice::open(driver, Box::new(MinutiaeEngine::default()), listener, 0)?;
        let mut demo = Self {
            runner: DeviceRunner::new(device, receiver),
            sensor,
            events,
        };

        match demo.next_event().await? {
            DeviceEvent::OpenComplete(Ok(())) => Ok(demo),
            DeviceEvent::OpenComplete(Err(fault)) => bail!("open failed: {}", fault),
            other => bail!("unexpected {} while opening", other.name()),
        }
    }

    fn device(&mut self) -> &mut ImgDevice {
        self.runner.device_mut()
    }

    /// Next delivered event, applying driver callbacks until one arrives.
    async fn next_event(&mut self) -> Result<DeviceEvent> {
        loop {
            if let Ok(event) = self.events.try_recv() {
                debug!(event = event.name(), "received event");
                return Ok(event);
            }
            if !self.runner.step().await? {
                bail!("driver went away");
            }
        }
    }

    async fn expect_started(&mut self) -> Result<()> {
        match self.next_event().await? {
            DeviceEvent::Started { status: Ok(()), .. } => Ok(()),
            DeviceEvent::Started {
                status: Err(fault), ..
            } => bail!("activation failed: {}", fault),
            other => bail!("unexpected {} while starting", other.name()),
        }
    }

    async fn expect_stopped(&mut self) -> Result<()> {
        match self.next_event().await? {
            DeviceEvent::Stopped { action } => {
                debug!(%action, "stopped");
                Ok(())
            }
            other => bail!("unexpected {} while stopping", other.name()),
        }
    }

    fn touch(&self, finger: Finger) -> Result<()> {
        self.sensor
            .scan(finger.image())
            .context("sensor channel closed")
    }

    /// Enroll `finger`, touching the sensor until the template is complete.
    pub async fn enroll(&mut self, finger: Finger) -> Result<PrintData> {
        self.device().enroll_start()?;
        self.expect_started().await?;

        let stages = self.device().enroll_stages();
        let mut template = None;
        for _ in 0..MAX_TOUCHES {
            self.touch(finger)?;
            match self.next_event().await? {
                DeviceEvent::EnrollStageCompleted {
                    result: Ok(EnrollResult::Complete),
                    print,
                    ..
                } => {
                    info!(stages, "enrollment complete");
                    template = print;
                    break;
                }
                DeviceEvent::EnrollStageCompleted {
                    result: Ok(EnrollResult::Pass),
                    ..
                } => {
                    let stage = self.device().session().enroll_stage();
                    info!("stage {}/{} passed", stage, stages);
                }
                DeviceEvent::EnrollStageCompleted {
                    result: Ok(EnrollResult::Retry(reason)),
                    ..
                } => warn!(?reason, "scan rejected, touch again"),
                DeviceEvent::EnrollStageCompleted { result, .. } => {
                    bail!("enrollment failed: {:?}", result)
                }
                other => bail!("unexpected {} while enrolling", other.name()),
            }
        }

        self.device().enroll_stop()?;
        self.expect_stopped().await?;
        template.context("enrollment did not complete")
    }

    /// Verify `finger` against `reference`.
    pub async fn verify(&mut self, reference: PrintData, finger: Finger) -> Result<bool> {
        self.device().verify_start(reference)?;
        self.expect_started().await?;

        let mut matched = None;
        for _ in 0..MAX_TOUCHES {
            self.touch(finger)?;
            match self.next_event().await? {
                DeviceEvent::VerifyResult {
                    result: Ok(VerifyResult::Retry(reason)),
                    ..
                } => warn!(?reason, "scan rejected, touch again"),
                DeviceEvent::VerifyResult { result, .. } => {
                    matched = Some(result? == VerifyResult::Match);
                    break;
                }
                other => bail!("unexpected {} while verifying", other.name()),
            }
        }

        self.device().verify_stop()?;
        self.expect_stopped().await?;
        matched.context("verification did not finish")
    }

    /// Search `gallery` for `finger`, returning the matching index.
    pub async fn identify(&mut self, gallery: Vec<PrintData>, finger: Finger) -> Result<Option<usize>> {
        self.device().identify_start(gallery)?;
        self.expect_started().await?;

        let mut outcome = None;
        for _ in 0..MAX_TOUCHES {
            self.touch(finger)?;
            match self.next_event().await? {
                DeviceEvent::IdentifyResult {
                    result: Ok(VerifyResult::Retry(reason)),
                    ..
                } => warn!(?reason, "scan rejected, touch again"),
                DeviceEvent::IdentifyResult {
                    result,
                    match_offset,
                    ..
                } => {
                    result?;
                    outcome = Some(match_offset);
                    break;
                }
                other => bail!("unexpected {} while identifying", other.name()),
            }
        }

        self.device().identify_stop()?;
        self.expect_stopped().await?;
        outcome.context("identification did not finish")
    }

    /// Capture one standardized image of `finger`.
    pub async fn capture(&mut self, finger: Finger) -> Result<Image> {
        self.device().capture_start(false)?;
        self.expect_started().await?;

        self.touch(finger)?;
        let image = match self.next_event().await? {
            DeviceEvent::CaptureResult {
                result: Ok(CaptureResult::Complete),
                image,
            } => image.context("capture delivered no image")?,
            DeviceEvent::CaptureResult { result, .. } => bail!("capture failed: {:?}", result),
            other => bail!("unexpected {} while capturing", other.name()),
        };

        self.device().capture_stop()?;
        self.expect_stopped().await?;
        Ok(image)
    }

    /// Close the device.
    pub async fn close(mut self) -> Result<()> {
        self.device().close()?;
        match self.next_event().await? {
            DeviceEvent::CloseComplete => Ok(()),
            other => bail!("unexpected {} while closing", other.name()),
        }
    }
}
