//! Filename transforms shared by every URL convention.

/// Derive the stable identifier used in adaptive-stream manifest paths.
///
/// The extension (text after the last `.`) is dropped, the stem is
/// lowercased, every run of whitespace becomes a single `-`, and finally
/// every character outside `[a-z0-9_.-]` is removed.
///
/// ```
/// use multicam_sources::slug_from_filename;
///
/// assert_eq!(slug_from_filename("Cam1 (teto).mp4"), "cam1-teto");
/// ```
#[must_use]
pub fn slug_from_filename(filename: &str) -> String {
    let stem = filename.rfind('.').map_or(filename, |dot| &filename[..dot]);

    let mut slug = String::with_capacity(stem.len());
    let mut in_whitespace = false;
    for ch in stem.to_lowercase().chars() {
        if is_ecma_whitespace(ch) {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        slug.push(ch);
    }

    slug.retain(|ch| matches!(ch, 'a'..='z' | '0'..='9' | '_' | '.' | '-'));
    slug
}

/// Name of the low-resolution preview asset: `.preview` goes before the
/// extension, or at the end when there is none.
#[must_use]
pub fn preview_filename(filename: &str) -> String {
    match filename.rfind('.') {
        Some(dot) => format!("{}.preview{}", &filename[..dot], &filename[dot..]),
        None => format!("{filename}.preview"),
    }
}

/// Whitespace as matched by `\s` in manifest tooling regexes.
///
/// Unicode `White_Space` minus NEL (U+0085), plus the byte-order mark.
fn is_ecma_whitespace(ch: char) -> bool {
    match ch {
        '\u{0085}' => false,
        '\u{feff}' => true,
        other => other.is_whitespace(),
    }
}
