use regex::Regex;

/// Bundler filename template (e.g. `[id].[fullhash].hot-update.js`) compiled into a matcher.
#[derive(Debug, Clone)]
pub struct PathTemplate {
  pattern: Regex,
}

impl PathTemplate {
  /// Compile `template`, binding `[hash]`/`[fullhash]` to `build_hash` when it is known.
  ///
  /// A bound hash only matches fragments named after this build. Hot update fragments a watch
  /// rebuild names after the previous compilation's hash are not matched and classify as
  /// ordinary assets; pass `None` to accept any hash.
  pub fn compile(template: &str, build_hash: Option<&str>) -> Result<Self, regex::Error> {
    let mut expression = String::from("^");
    let mut rest = template;

    while let Some(open) = rest.find('[') {
      expression.push_str(&regex::escape(&rest[..open]));
      let after_open = &rest[open..];
      let Some(close) = after_open.find(']') else {
        rest = after_open;
        break;
      };

      let placeholder = &after_open[1..close];
      match placeholder_pattern(placeholder, build_hash) {
        Some(pattern) => expression.push_str(&pattern),
        None => expression.push_str(&regex::escape(&after_open[..=close])),
      }
      rest = &after_open[close + 1..];
    }
    expression.push_str(&regex::escape(rest));
    expression.push('$');

    Ok(Self {
      pattern: Regex::new(&expression)?,
    })
  }

  /// Whether `file_name` could have been produced by this template.
  pub fn matches(&self, file_name: &str) -> bool {
    self.pattern.is_match(file_name)
  }
}

fn placeholder_pattern(placeholder: &str, build_hash: Option<&str>) -> Option<String> {
  let (name, length) = match placeholder.split_once(':') {
    Some((name, length)) => (name, Some(length.parse::<usize>().ok()?)),
    None => (placeholder, None),
  };

  let hash_pattern = || match length {
    Some(length) => format!("[A-Za-z0-9_-]{{1,{length}}}"),
    None => "[A-Za-z0-9_-]+".to_string(),
  };

  let pattern = match name {
    "hash" | "fullhash" => match build_hash.filter(|hash| !hash.is_empty()) {
      Some(hash) => {
        let end = length.map_or(hash.len(), |length| length.min(hash.len()));
        regex::escape(hash.get(..end).unwrap_or(hash))
      }
      None => hash_pattern(),
    },
    "chunkhash" | "contenthash" | "modulehash" => hash_pattern(),
    "id" | "name" | "base" | "path" => ".+?".to_string(),
    "file" => ".+".to_string(),
    "ext" => r"\.[^./]+".to_string(),
    "query" => r"(?:\?.*)?".to_string(),
    _ => return None,
  };
  Some(pattern)
}

#[cfg(test)]
mod tests {
  use super::PathTemplate;

  #[test]
  fn matches_hot_update_names_for_the_current_hash() {
    let template = PathTemplate::compile("[id].[fullhash].hot-update.js", Some("42b6e1ec")).unwrap();
    assert!(template.matches("main.42b6e1ec.hot-update.js"));
    assert!(!template.matches("main.deadbeef.hot-update.js"));
    assert!(!template.matches("main.42b6e1ec.js"));
  }

  #[test]
  fn fragments_from_a_previous_build_need_an_unbound_hash() {
    let previous = "main.0f0f0f0f.hot-update.js";
    let bound = PathTemplate::compile("[id].[fullhash].hot-update.js", Some("42b6e1ec")).unwrap();
    let unbound = PathTemplate::compile("[id].[fullhash].hot-update.js", None).unwrap();
    assert!(!bound.matches(previous));
    assert!(unbound.matches(previous));
  }

  #[test]
  fn falls_back_to_any_hash_without_build_hash() {
    let template = PathTemplate::compile("[id].[hash].hot-update.js", None).unwrap();
    assert!(template.matches("0.9f86d081.hot-update.js"));
    assert!(!template.matches("0.9f86d081.hot-update.json"));
  }

  #[test]
  fn honours_hash_length_suffix() {
    let template = PathTemplate::compile("[id].[hash:8].hot-update.js", Some("0123456789abcdef")).unwrap();
    assert!(template.matches("main.01234567.hot-update.js"));
    assert!(!template.matches("main.0123456789abcdef.hot-update.js"));
  }

  #[test]
  fn escapes_literal_text_and_unknown_placeholders() {
    let template = PathTemplate::compile("maps/[file].map[unknown]", None).unwrap();
    assert!(template.matches("maps/app.js.map[unknown]"));
    assert!(!template.matches("mapsXapp.js.map[unknown]"));
  }

  #[test]
  fn unterminated_placeholder_is_literal() {
    let template = PathTemplate::compile("[file].map[", None).unwrap();
    assert!(template.matches("app.js.map["));
  }
}
