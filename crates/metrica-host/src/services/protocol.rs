// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line protocol between the host shell and the plugin.
//
// One JSON object per line, either
//   {"action": "reportEvent", "args": ["click", {"x": 1}]}
// or
//   {"lifecycle": "pause" | "resume" | "newIntent"}
// Every non-blank line is answered with `ok` or `error: <message>`.

use std::io::{BufRead, Write};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use metrica_core::error::Result;
use metrica_plugin::MetricaPlugin;

/// Host activity transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleEvent {
    Pause,
    Resume,
    NewIntent,
}

/// One decoded input line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HostMessage {
    Lifecycle {
        lifecycle: LifecycleEvent,
    },
    Command {
        action: String,
        #[serde(default)]
        args: Vec<Value>,
    },
}

impl HostMessage {
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Hand one message to the plugin and wait for its outcome.
pub fn dispatch(plugin: &MetricaPlugin, message: HostMessage) -> Result<()> {
    match message {
        HostMessage::Command { action, args } => plugin.submit(&action, &args).wait(),
        HostMessage::Lifecycle { lifecycle } => {
            match lifecycle {
                LifecycleEvent::Pause => plugin.on_pause(),
                LifecycleEvent::Resume => plugin.on_resume(),
                LifecycleEvent::NewIntent => plugin.on_new_intent(),
            }
            Ok(())
        }
    }
}

/// Read messages until end of input, writing one reply line per message.
///
/// Only I/O failures end the loop; bad lines are reported and skipped.
#[instrument(skip_all)]
pub fn serve<R, W>(plugin: &MetricaPlugin, input: R, mut output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut handled = 0usize;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome = HostMessage::parse(&line).and_then(|message| dispatch(plugin, message));
        match outcome {
            Ok(()) => writeln!(output, "ok")?,
            Err(e) => writeln!(output, "error: {e}")?,
        }
        output.flush()?;
        handled += 1;
    }
    debug!(handled, "end of input");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use serde_json::json;

    fn run(input: &str) -> (Vec<String>, MetricaPlugin) {
        let plugin = MetricaPlugin::new(metrica_bridge::platform_sdk()).expect("plugin");
        let mut output = Vec::new();
        serve(&plugin, Cursor::new(input), &mut output).expect("serve");
        let text = String::from_utf8(output).expect("utf-8 output");
        (text.lines().map(str::to_owned).collect(), plugin)
    }

    #[test]
    fn parses_commands_with_and_without_args() {
        assert_eq!(
            HostMessage::parse(r#"{"action": "reportEvent", "args": ["click", {"x": 1}]}"#)
                .expect("command"),
            HostMessage::Command {
                action: "reportEvent".into(),
                args: vec![json!("click"), json!({"x": 1})],
            }
        );
        assert_eq!(
            HostMessage::parse(r#"{"action": "setLoggingEnabled"}"#).expect("no args"),
            HostMessage::Command {
                action: "setLoggingEnabled".into(),
                args: Vec::new(),
            }
        );
    }

    #[test]
    fn parses_lifecycle_events() {
        assert_eq!(
            HostMessage::parse(r#"{"lifecycle": "newIntent"}"#).expect("lifecycle"),
            HostMessage::Lifecycle {
                lifecycle: LifecycleEvent::NewIntent
            }
        );
        assert!(HostMessage::parse(r#"{"lifecycle": "sleep"}"#).is_err());
    }

    #[test]
    fn replies_once_per_line() {
        let input = concat!(
            r#"{"lifecycle": "resume"}"#,
            "\n",
            r#"{"action": "activate", "args": [{"apiKey": "K"}]}"#,
            "\n\n",
            r#"{"action": "frobnicate"}"#,
            "\n",
            r#"{"action": "setSessionTimeout", "args": ["ten"]}"#,
            "\n",
            "not json\n",
            r#"{"lifecycle": "pause"}"#,
            "\n",
        );
        let (lines, plugin) = run(input);

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "ok");
        assert_eq!(lines[1], "ok");
        assert_eq!(lines[2], "error: Unknown action: frobnicate");
        assert_eq!(
            lines[3],
            "error: setSessionTimeout: argument 0 is not an integer"
        );
        assert!(lines[4].starts_with("error: "));
        assert_eq!(lines[5], "ok");

        assert!(plugin.is_activated());
        assert!(plugin.is_paused());
    }

    #[test]
    fn empty_input_produces_no_output() {
        let (lines, plugin) = run("");
        assert!(lines.is_empty());
        assert!(!plugin.is_activated());
    }
}
