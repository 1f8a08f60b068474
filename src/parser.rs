use crate::dialog::{Dialog, Interval};
use crate::error::CondenseError;
use crate::timestamp;

use std::path::Path;

const ARROW: &str = "-->";
const SRT_TOKENS: usize = 3;
const DIALOGUE_MARKER: &str = "Dialogue:";
const ASS_FIELDS: usize = 10;

/// The subtitle flavours we know how to read timings from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// `start --> end` cue lines, as in SubRip files.
    Srt,
    /// Comma separated `Dialogue:` event lines, as in (Advanced) SubStation Alpha files.
    Ass,
}

impl SubtitleFormat {
    /// Anything that isn't `.ass` or `.ssa` is read as SRT.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("ass") | Some("ssa") => SubtitleFormat::Ass,
            _ => SubtitleFormat::Srt,
        }
    }

    /// Extracts the dialog cues in the order they appear in the file.
    ///
    /// Cues are neither sorted nor merged. A file without any cue lines
    /// yields an empty list rather than an error.
    pub fn parse(self, input: &str) -> Result<Vec<Dialog>, CondenseError> {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        match self {
            SubtitleFormat::Srt => parse_srt(input),
            SubtitleFormat::Ass => parse_ass(input),
        }
    }
}

fn numbered_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
}

fn parse_srt(input: &str) -> Result<Vec<Dialog>, CondenseError> {
    let lines: Vec<(usize, &str)> = numbered_lines(input).collect();
    let mut dialogs = Vec::new();

    for (idx, &(number, line)) in lines.iter().enumerate() {
        if !line.contains(ARROW) {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < SRT_TOKENS {
            return Err(CondenseError::MalformedSubtitle {
                line: number,
                expected: SRT_TOKENS,
                found: tokens.len(),
            });
        }
        let start = timestamp::decode(tokens[0])?;
        let end = timestamp::decode(tokens[2])?;

        let text = lines[idx + 1..]
            .iter()
            .map(|&(_, line)| line.trim())
            .take_while(|line| !line.is_empty() && !line.contains(ARROW))
            .collect::<Vec<_>>()
            .join("\n");

        dialogs.push(Dialog {
            interval: Interval::new(start, end),
            text,
        });
    }

    Ok(dialogs)
}

fn parse_ass(input: &str) -> Result<Vec<Dialog>, CondenseError> {
    let mut dialogs = Vec::new();

    for (number, line) in numbered_lines(input) {
        let line = line.trim_start();
        if !line.starts_with(DIALOGUE_MARKER) {
            continue;
        }
        // The text is the last field and may itself contain commas.
        let fields: Vec<&str> = line.splitn(ASS_FIELDS, ',').collect();
        if fields.len() < ASS_FIELDS {
            return Err(CondenseError::MalformedSubtitle {
                line: number,
                expected: ASS_FIELDS,
                found: fields.len(),
            });
        }
        let start = timestamp::decode(fields[1])?;
        let end = timestamp::decode(fields[2])?;

        dialogs.push(Dialog {
            interval: Interval::new(start, end),
            text: ass_text(fields[ASS_FIELDS - 1]),
        });
    }

    Ok(dialogs)
}

/// Strips `{...}` override blocks and turns hard line breaks into spaces.
fn ass_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_override = false;
    for c in raw.chars() {
        match c {
            '{' => in_override = true,
            '}' if in_override => in_override = false,
            _ if in_override => (),
            _ => text.push(c),
        }
    }
    text.replace("\\N", " ")
        .replace("\\n", " ")
        .replace("\\h", " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn spans(dialogs: &[Dialog]) -> Vec<(u128, u128)> {
        dialogs
            .iter()
            .map(|d| (d.interval.start.as_millis(), d.interval.end.as_millis()))
            .collect()
    }

    const SRT: &str = "1
00:00:01,000 --> 00:00:02,000
Hello there.

2
00:00:03,500 --> 00:00:05,250
General Kenobi!
You are a bold one.

3
00:01:00,000 --> 00:01:01,000 X1:40 X2:600 Y1:20 Y2:50
Positioned.
";

    const ASS: &str = "[Script Info]
Title: Example
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.50,0:00:03.00,Default,,0,0,0,,{\\i1}Hello,{\\i0} world
Comment: 0,0:00:02.00,0:00:04.00,Default,,0,0,0,,Not spoken
Dialogue: 0,0:00:10.00,0:00:12.25,Default,,0,0,0,,First line\\NSecond line
";

    #[test]
    fn srt_single_cue() {
        let dialogs = SubtitleFormat::Srt
            .parse("00:00:01,000 --> 00:00:02,000")
            .unwrap();
        assert_eq!(
            dialogs[0].interval,
            Interval::new(Duration::from_secs(1), Duration::from_secs(2))
        );
        assert_eq!(dialogs.len(), 1);
    }

    #[test]
    fn srt_file_in_line_order() {
        let dialogs = SubtitleFormat::Srt.parse(SRT).unwrap();
        assert_eq!(
            spans(&dialogs),
            vec![(1000, 2000), (3500, 5250), (60_000, 61_000)]
        );
        assert_eq!(dialogs[0].text, "Hello there.");
        assert_eq!(dialogs[1].text, "General Kenobi!\nYou are a bold one.");
    }

    #[test]
    fn srt_crlf_and_bom() {
        let input = "\u{FEFF}1\r\n00:00:01,000 --> 00:00:02,000\r\nHi\r\n\r\n";
        let dialogs = SubtitleFormat::Srt.parse(input).unwrap();
        assert_eq!(spans(&dialogs), vec![(1000, 2000)]);
        assert_eq!(dialogs[0].text, "Hi");
    }

    #[test]
    fn srt_does_not_sort() {
        let input = "00:00:05,000 --> 00:00:06,000\n\n00:00:01,000 --> 00:00:02,000\n";
        let dialogs = SubtitleFormat::Srt.parse(input).unwrap();
        assert_eq!(spans(&dialogs), vec![(5000, 6000), (1000, 2000)]);
    }

    #[test]
    fn srt_truncated_arrow_line() {
        match SubtitleFormat::Srt.parse("00:00:01,000 -->") {
            Err(CondenseError::MalformedSubtitle { line, found, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(found, 2);
            }
            other => panic!("expected malformed subtitle, got {:?}", other),
        }
    }

    #[test]
    fn srt_bad_timestamp() {
        let err = SubtitleFormat::Srt
            .parse("00:00:01,000 --> 00:xx:02,000")
            .unwrap_err();
        assert!(matches!(err, CondenseError::Decode { .. }));
    }

    #[test]
    fn ass_file() {
        let dialogs = SubtitleFormat::Ass.parse(ASS).unwrap();
        assert_eq!(spans(&dialogs), vec![(1500, 3000), (10_000, 12_250)]);
        assert_eq!(dialogs[0].text, "Hello, world");
        assert_eq!(dialogs[1].text, "First line Second line");
    }

    #[test]
    fn ass_nine_fields() {
        let line = "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,Text";
        match SubtitleFormat::Ass.parse(line) {
            Err(CondenseError::MalformedSubtitle {
                line,
                expected,
                found,
            }) => {
                assert_eq!(line, 1);
                assert_eq!(expected, 10);
                assert_eq!(found, 9);
            }
            other => panic!("expected malformed subtitle, got {:?}", other),
        }
    }

    #[test]
    fn ass_ten_fields() {
        let line = "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Text";
        let dialogs = SubtitleFormat::Ass.parse(line).unwrap();
        assert_eq!(spans(&dialogs), vec![(1000, 2000)]);
    }

    #[test]
    fn no_cues_is_empty() {
        assert!(SubtitleFormat::Srt.parse("").unwrap().is_empty());
        assert!(SubtitleFormat::Ass
            .parse("[Script Info]\nTitle: Nothing\n")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            SubtitleFormat::from_path(Path::new("a/b.ass")),
            SubtitleFormat::Ass
        );
        assert_eq!(
            SubtitleFormat::from_path(Path::new("b.SSA")),
            SubtitleFormat::Ass
        );
        assert_eq!(
            SubtitleFormat::from_path(Path::new("b.en.srt")),
            SubtitleFormat::Srt
        );
        assert_eq!(
            SubtitleFormat::from_path(Path::new("b.vtt")),
            SubtitleFormat::Srt
        );
        assert_eq!(
            SubtitleFormat::from_path(Path::new("noext")),
            SubtitleFormat::Srt
        );
    }
}
