use hex_slice::AsHex;

/// Posix-style path normalization: collapses repeated separators, resolves
/// `.` and `..` segments and keeps a trailing separator.
pub fn normalize(path: &str) -> String {
  if path.is_empty() {
    return ".".to_string();
  }
  let absolute = path.starts_with('/');
  let trailing = path.ends_with('/');

  let mut segments: Vec<&str> = vec![];
  for segment in path.split('/') {
    match segment {
      "" | "." => (),
      ".." => match segments.last() {
        Some(&last) if last != ".." => {
          segments.pop();
        }
        _ if absolute => (),
        _ => segments.push(".."),
      },
      _ => segments.push(segment),
    }
  }

  let mut res = segments.join("/");
  if res.is_empty() && !absolute {
    res.push('.');
  }
  if trailing && !res.is_empty() {
    res.push('/');
  }
  if absolute {
    res.insert(0, '/');
  }
  res
}

/// Joins the non-empty parts with `/` and normalizes the result.
pub fn join(parts: &[&str]) -> String {
  let joined = parts
    .iter()
    .filter(|part| !part.is_empty())
    .cloned()
    .collect::<Vec<_>>()
    .join("/");
  normalize(&joined)
}

/// 96 random bits, hex encoded; document-store style identifier.
pub fn gen_id() -> String {
  use rand::prelude::*;

  let mut data = [0u8; 12];
  rand::thread_rng().fill_bytes(&mut data);
  format!("{:02x}", data.plain_hex(false))
}
