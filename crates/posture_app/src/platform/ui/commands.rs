use std::path::PathBuf;

use posture_core::{ControlsView, Msg};

pub const HELP_TEXT: &str = "\
Commands:
  record        start recording from the camera
  stop          stop recording and stage the clip
  open <path>   stage a video or image file
  submit        compute the back angle for the staged media
  advise        get recommendations for the computed angle
  dismiss       clear the current notice
  status        show the current state
  help          show this help
  quit          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Record,
    Stop,
    Open(PathBuf),
    Submit,
    Advise,
    Dismiss,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "record" | "start" => Command::Record,
        "stop" => Command::Stop,
        "open" | "file" if !rest.is_empty() => Command::Open(PathBuf::from(rest)),
        "submit" | "angle" => Command::Submit,
        "advise" | "advice" | "recommend" => Command::Advise,
        "dismiss" => Command::Dismiss,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

impl Command {
    /// Label of the control this command stands for, if it is currently disabled.
    pub fn disabled_control(&self, controls: &ControlsView) -> Option<&'static str> {
        let (label, enabled) = match self {
            Command::Record => ("Start recording", controls.start_recording),
            Command::Stop => ("Stop recording", controls.stop_recording),
            Command::Open(_) => ("File input", controls.file_input),
            Command::Submit => ("Submit", controls.submit),
            Command::Advise => ("Get recommendations", controls.advise),
            _ => return None,
        };
        (!enabled).then_some(label)
    }

    /// Core message for commands that map directly onto one.
    /// `Open` needs the file read first and is handled by the caller.
    pub fn to_msg(&self) -> Option<Msg> {
        match self {
            Command::Record => Some(Msg::StartRecordingClicked),
            Command::Stop => Some(Msg::StopRecordingClicked),
            Command::Submit => Some(Msg::SubmitClicked),
            Command::Advise => Some(Msg::AdviceClicked),
            Command::Dismiss => Some(Msg::DismissNotice),
            _ => None,
        }
    }
}
