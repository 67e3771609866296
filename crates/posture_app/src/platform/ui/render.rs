use posture_core::{
    sanitize_line, AppViewModel, CaptureStatus, ControlsView, HealthStatus, Notice, PhaseKind,
    Severity,
};

/// Text frame for the current view. `notice_stamp` is the local time the
/// current notice first appeared.
pub fn render(view: &AppViewModel, notice_stamp: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Backend: {}", health_label(&view.health)));
    lines.push(format!(
        "State: {} | Elapsed: {}",
        phase_label(view),
        format_elapsed(view.elapsed_secs)
    ));
    if view.phase == PhaseKind::Recording {
        lines.push(format!("Recorded: {}", format_bytes(view.recorded_bytes)));
    }

    if let Some(artifact) = &view.artifact {
        lines.push(format!(
            "Media: {} ({}, {})",
            artifact.filename,
            artifact.mime_type,
            format_bytes(artifact.byte_len)
        ));
    }
    if view.busy {
        lines.push("Computing angle...".to_string());
    }
    if let Some(angle) = view.angle {
        lines.push(format!("Average back angle: {angle:.1}°"));
    }
    if view.advice_pending {
        lines.push("Fetching recommendations...".to_string());
    }
    let advice = view.advice_lines();
    if !advice.is_empty() {
        lines.push("Recommendations:".to_string());
        lines.extend(advice.into_iter().map(|line| format!("  {line}")));
    }

    if let Some(notice) = &view.notice {
        lines.push(format_notice(notice, notice_stamp));
    }
    lines.push(format!("Available: {}", available_commands(&view.controls)));
    lines
}

fn health_label(health: &HealthStatus) -> String {
    match health {
        HealthStatus::Checking => "checking...".to_string(),
        HealthStatus::Ok(message) => sanitize_line(message),
        HealthStatus::Unreachable => "unreachable".to_string(),
        HealthStatus::ConnectionError => "error connecting".to_string(),
    }
}

fn phase_label(view: &AppViewModel) -> &'static str {
    match (view.phase, view.recording) {
        (PhaseKind::Recording, Some(CaptureStatus::Acquiring)) => "Waiting for camera",
        (PhaseKind::Recording, Some(CaptureStatus::Stopping)) => "Finishing recording",
        (PhaseKind::Recording, _) => "Recording",
        (PhaseKind::Idle, _) => "Idle",
        (PhaseKind::Staged, _) => "Ready to submit",
        (PhaseKind::Submitting, _) => "Submitting",
        (PhaseKind::Submitted, _) => "Analyzed",
    }
}

fn format_notice(notice: &Notice, stamp: Option<&str>) -> String {
    let level = match notice.severity() {
        Severity::Warning => "Warning",
        Severity::Error => "Error",
    };
    let mut text = match stamp {
        Some(stamp) => format!("[{stamp}] {level}: {notice}"),
        None => format!("{level}: {notice}"),
    };
    if let Some(detail) = notice.detail().filter(|detail| !detail.is_empty()) {
        text.push_str(&format!(" ({})", sanitize_line(detail)));
    }
    text
}

fn available_commands(controls: &ControlsView) -> String {
    let mut commands = Vec::new();
    if controls.start_recording {
        commands.push("record");
    }
    if controls.stop_recording {
        commands.push("stop");
    }
    if controls.file_input {
        commands.push("open <path>");
    }
    if controls.submit {
        commands.push("submit");
    }
    if controls.advise {
        commands.push("advise");
    }
    commands.push("help");
    commands.push("quit");
    commands.join(", ")
}

fn format_elapsed(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
