//! Device command handlers.

use serde::Serialize;
use tabled::Tabled;

use kodakhome_core::{Device, DeviceEventBucket, Event, EventType, SmartHomeSession};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Events")]
    events: usize,
    #[tabled(rename = "Motion")]
    motion: usize,
    #[tabled(rename = "Sound")]
    sound: usize,
    #[tabled(rename = "Battery")]
    battery: usize,
}

/// A device joined with its event counts.
#[derive(Serialize)]
struct DeviceSummary<'a> {
    #[serde(flatten)]
    device: &'a Device,
    event_count: usize,
    motion_events: usize,
    sound_events: usize,
    battery_events: usize,
    last_event: Option<&'a Event>,
}

impl<'a> DeviceSummary<'a> {
    fn new(device: &'a Device, bucket: Option<&'a DeviceEventBucket>) -> Self {
        let events = bucket.map(|b| b.events.as_slice()).unwrap_or_default();
        let count = |kind: EventType| events.iter().filter(|e| e.event_type == kind).count();
        Self {
            device,
            event_count: events.len(),
            motion_events: count(EventType::Motion),
            sound_events: count(EventType::Sound),
            battery_events: count(EventType::Battery),
            last_event: events.iter().max_by(|a, b| a.created_date.cmp(&b.created_date)),
        }
    }
}

impl From<&DeviceSummary<'_>> for DeviceRow {
    fn from(s: &DeviceSummary<'_>) -> Self {
        Self {
            id: s.device.device_id.clone(),
            name: s.device.field("name").unwrap_or("-").to_owned(),
            plan: s.device.field("plan_id").unwrap_or("-").to_owned(),
            events: s.event_count,
            motion: s.motion_events,
            sound: s.sound_events,
            battery: s.battery_events,
        }
    }
}

fn detail(s: &DeviceSummary<'_>) -> String {
    let last = s.last_event.map_or_else(
        || "-".to_owned(),
        |e| format!("{} ({})", util::format_created(e), e.event_type),
    );
    [
        format!("Device ID: {}", s.device.device_id),
        format!("Name:      {}", s.device.field("name").unwrap_or("-")),
        format!("Plan:      {}", s.device.field("plan_id").unwrap_or("-")),
        format!("Events:    {}", s.event_count),
        format!("  motion:  {}", s.motion_events),
        format!("  sound:   {}", s.sound_events),
        format!("  battery: {}", s.battery_events),
        format!("Last:      {last}"),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    session: &SmartHomeSession,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command.unwrap_or(DevicesCommand::List) {
        DevicesCommand::List => {
            let store = session.store();
            let summaries: Vec<DeviceSummary<'_>> = session
                .devices()?
                .iter()
                .map(|d| DeviceSummary::new(d, store.bucket(&d.device_id)))
                .collect();

            let out = output::render_list(
                &global.output,
                &summaries,
                |s| DeviceRow::from(s),
                |s| s.device.device_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let found = util::find_device(session, &device)?;
            let summary = DeviceSummary::new(found, session.device_events(&device)?);
            let out = output::render_single(&global.output, &summary, detail, |s| {
                s.device.device_id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
