//! Message templates for the text formatter.
//!
//! Placeholders are `{field}` or `{field:<N}` / `{field:>N}` / `{field:^N}`
//! with field one of `timestamp`, `level`, `name`, `message`, `module`,
//! `line`. `{{` and `}}` produce literal braces. Anything else is copied
//! through unchanged.

use std::fmt::Write as _;

use crate::record::LogRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Timestamp,
    Level,
    Name,
    Message,
    Module,
    Line,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "timestamp" => Some(Field::Timestamp),
            "level" => Some(Field::Level),
            "name" => Some(Field::Name),
            "message" => Some(Field::Message),
            "module" => Some(Field::Module),
            "line" => Some(Field::Line),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        field: Field,
        pad: Option<(Align, usize)>,
    },
}

/// A parsed message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    segments: Vec<Segment>,
}

impl MessageTemplate {
    /// Parse a template. Never fails; unrecognized placeholders stay literal.
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(pos) = rest.find(&['{', '}'][..]) {
            literal.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                literal.push_str(&tail[..1]);
                rest = &tail[2..];
                continue;
            }

            if tail.starts_with('{') {
                if let Some(end) = tail.find('}') {
                    if let Some(segment) = parse_placeholder(&tail[1..end]) {
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(segment);
                        rest = &tail[end + 1..];
                        continue;
                    }
                }
            }

            literal.push_str(&tail[..1]);
            rest = &tail[1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Render a record. `timestamp` is the already-formatted time.
    pub fn render(&self, record: &LogRecord, timestamp: &str) -> String {
        let mut out = String::with_capacity(64 + record.message.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, pad } => {
                    let value: &dyn std::fmt::Display = match field {
                        Field::Timestamp => &timestamp,
                        Field::Level => &record.level,
                        Field::Name => &record.name,
                        Field::Message => &record.message,
                        Field::Module => &record.module,
                        Field::Line => &record.line,
                    };
                    let _ = match *pad {
                        None => write!(out, "{value}"),
                        Some((Align::Left, width)) => write!(out, "{:<width$}", value.to_string()),
                        Some((Align::Right, width)) => write!(out, "{:>width$}", value.to_string()),
                        Some((Align::Center, width)) => write!(out, "{:^width$}", value.to_string()),
                    };
                }
            }
        }
        out
    }
}

fn parse_placeholder(inner: &str) -> Option<Segment> {
    let (name, spec) = match inner.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (inner, None),
    };
    let field = Field::from_name(name)?;

    let pad = match spec {
        None => None,
        Some(spec) => {
            let mut chars = spec.chars();
            let align = match chars.next()? {
                '<' => Align::Left,
                '>' => Align::Right,
                '^' => Align::Center,
                _ => return None,
            };
            let width: usize = chars.as_str().parse().ok()?;
            Some((align, width))
        }
    };

    Some(Segment::Field { field, pad })
}
