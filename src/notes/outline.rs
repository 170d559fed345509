/// One line of a parsed notes outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineBlock {
    /// A `**text**` section heading.
    Heading(String),
    /// A `- ` bullet. `depth` is one of the three visual indent levels
    /// (0, 1, 2); deeper indentation clamps to 2.
    Bullet { depth: u8, text: String },
    /// Any other non-empty line, kept verbatim.
    Text(String),
    Blank,
}

/// Parse generated notes text into outline blocks.
pub fn parse_outline(text: &str) -> Vec<OutlineBlock> {
    text.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> OutlineBlock {
    let trimmed = line.trim_end();
    if trimmed.trim().is_empty() {
        return OutlineBlock::Blank;
    }

    let stripped = trimmed.trim_start();
    if let Some(inner) = stripped
        .strip_prefix("**")
        .and_then(|rest| rest.strip_suffix("**"))
    {
        if !inner.is_empty() {
            return OutlineBlock::Heading(inner.to_string());
        }
    }

    if let Some(body) = stripped.strip_prefix("- ") {
        let leading = trimmed.len() - stripped.len();
        return OutlineBlock::Bullet {
            depth: depth_for_indent(leading),
            text: body.to_string(),
        };
    }

    OutlineBlock::Text(trimmed.to_string())
}

/// Two spaces of indentation per nesting step, folded onto three visual
/// levels: 0 spaces, 2-4 spaces, 6 or more.
fn depth_for_indent(leading_spaces: usize) -> u8 {
    match leading_spaces / 2 {
        0 => 0,
        1 | 2 => 1,
        _ => 2,
    }
}

/// Render notes as simple HTML: headings become `<strong>`, bullets become
/// divs with one of three fixed indent classes, inline `**bold**` spans are
/// converted in place.
pub fn render_html(text: &str) -> String {
    parse_outline(text)
        .into_iter()
        .map(|block| match block {
            OutlineBlock::Heading(title) => {
                format!("<div class=\"heading\"><strong>{}</strong></div>", title)
            }
            OutlineBlock::Bullet { depth, text } => {
                let class = match depth {
                    0 => "bullet ml-0",
                    1 => "bullet ml-6",
                    _ => "bullet ml-12",
                };
                format!("<div class=\"{}\">- {}</div>", class, bold_spans(&text))
            }
            OutlineBlock::Text(text) => format!("<div>{}</div>", bold_spans(&text)),
            OutlineBlock::Blank => "<div></div>".to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace paired `**` markers with `<strong>` tags. An unmatched trailing
/// marker is left as-is.
fn bold_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        match rest.find("**") {
            None => {
                out.push_str(rest);
                return out;
            }
            Some(open) => {
                let after = &rest[open + 2..];
                match after.find("**") {
                    None => {
                        out.push_str(rest);
                        return out;
                    }
                    Some(close) => {
                        out.push_str(&rest[..open]);
                        out.push_str("<strong>");
                        out.push_str(&after[..close]);
                        out.push_str("</strong>");
                        rest = &after[close + 2..];
                    }
                }
            }
        }
    }
}
