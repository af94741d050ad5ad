// ----------------------------------------------------------------------------
// Line tokenizer

/// Split one source line into fields. Space, comma, tab and parentheses
/// separate fields (so `8(x2)` becomes `8`, `x2`), a double-quoted
/// literal stays one field, and `#` starts a comment. A leading
/// `label:` is split off as its own field, keeping the colon.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;

    for ch in line.chars() {
        if quoted {
            field.push(ch);
            if ch == '"' {
                quoted = false;
            }
            continue;
        }
        match ch {
            '"' => {
                field.push(ch);
                quoted = true;
            }
            '#' => break,
            ' ' | ',' | '\t' | '(' | ')' => {
                if !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                }
            }
            _ => field.push(ch),
        }
    }
    if !field.is_empty() {
        fields.push(field);
    }

    // `lbl:add` -> `lbl:` `add`
    if fields
        .first()
        .map_or(false, |f| f.contains(':') && !f.starts_with('"'))
    {
        let mut rebuilt = split_colon(&fields[0]);
        rebuilt.extend(fields.drain(1..));
        fields = rebuilt;
    }
    fields
}

fn split_colon(field: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = field;
    while let Some((label, tail)) = rest.split_once(':') {
        if !label.is_empty() {
            out.push(format!("{label}:"));
        }
        rest = tail;
    }
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

// ----------------------------------------------------------------------------
