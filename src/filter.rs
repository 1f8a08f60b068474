use crate::dialog::Interval;
use crate::error::CondenseError;

pub const OUTPUT_LABEL: &str = "[out]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGraph {
    pub description: String,
    pub output: &'static str,
}

/// `track` selects an audio stream of the first input; `None` uses the default one.
pub fn build(spans: &[Interval], track: Option<usize>) -> Result<FilterGraph, CondenseError> {
    let input = match track {
        Some(idx) => format!("[0:a:{}]", idx),
        None => "[0:a]".to_string(),
    };

    let description = match spans {
        [] => return Err(CondenseError::EmptyDialog),
        [span] => trim(&input, span, OUTPUT_LABEL),
        _ => {
            let mut parts: Vec<String> = spans
                .iter()
                .enumerate()
                .map(|(idx, span)| trim(&input, span, &format!("[s{}]", idx)))
                .collect();

            let inputs: String = (0..spans.len()).map(|idx| format!("[s{}]", idx)).collect();
            parts.push(format!(
                "{}concat=n={}:v=0:a=1{}",
                inputs,
                spans.len(),
                OUTPUT_LABEL
            ));

            parts.join(";")
        }
    };

    Ok(FilterGraph {
        description,
        output: OUTPUT_LABEL,
    })
}

fn trim(input: &str, span: &Interval, label: &str) -> String {
    format!(
        "{}atrim=start={:.3}:end={:.3},asetpts=PTS-STARTPTS{}",
        input,
        span.start.as_secs_f64(),
        span.end.as_secs_f64(),
        label
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::time::Duration;

    fn iv(start: u64, end: u64) -> Interval {
        Interval::new(Duration::from_millis(start), Duration::from_millis(end))
    }

    fn trim_labels(description: &str) -> Vec<String> {
        let re = Regex::new(r"asetpts=PTS-STARTPTS\[(s\d+)\]").unwrap();
        re.captures_iter(description)
            .map(|c| c[1].to_string())
            .collect()
    }

    #[test]
    fn single_span() {
        let graph = build(&[iv(9000, 13_000)], None).unwrap();
        assert_eq!(
            graph.description,
            "[0:a]atrim=start=9.000:end=13.000,asetpts=PTS-STARTPTS[out]"
        );
        assert_eq!(graph.output, "[out]");
    }

    #[test]
    fn single_span_millisecond_precision() {
        let graph = build(&[iv(1, 123_456)], Some(2)).unwrap();
        assert_eq!(
            graph.description,
            "[0:a:2]atrim=start=0.001:end=123.456,asetpts=PTS-STARTPTS[out]"
        );
    }

    #[test]
    fn multiple_spans() {
        let graph = build(&[iv(9000, 12_500), iv(19_500, 23_000)], None).unwrap();
        assert_eq!(
            graph.description,
            "[0:a]atrim=start=9.000:end=12.500,asetpts=PTS-STARTPTS[s0];\
             [0:a]atrim=start=19.500:end=23.000,asetpts=PTS-STARTPTS[s1];\
             [s0][s1]concat=n=2:v=0:a=1[out]"
        );
    }

    #[test]
    fn every_trim_reads_the_selected_track() {
        let spans: Vec<Interval> = (0..5).map(|i| iv(i * 10_000, i * 10_000 + 500)).collect();
        let graph = build(&spans, Some(1)).unwrap();
        assert_eq!(graph.description.matches("[0:a:1]atrim=").count(), 5);
        assert!(!graph.description.contains("[0:a]"));
    }

    #[test]
    fn trim_labels_match_span_count() {
        for count in 2..40u64 {
            let spans: Vec<Interval> = (0..count).map(|i| iv(i * 3000, i * 3000 + 1000)).collect();
            let graph = build(&spans, None).unwrap();

            let labels = trim_labels(&graph.description);
            let expected: Vec<String> = (0..count).map(|i| format!("s{}", i)).collect();
            assert_eq!(labels, expected);

            let concat_inputs: String = expected.iter().map(|l| format!("[{}]", l)).collect();
            assert!(graph
                .description
                .ends_with(&format!("{}concat=n={}:v=0:a=1[out]", concat_inputs, count)));
        }
    }

    #[test]
    fn no_spans() {
        assert!(matches!(build(&[], None), Err(CondenseError::EmptyDialog)));
    }
}
