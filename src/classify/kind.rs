/// Semantic kind of an emitted file, derived from its extension.
///
/// Query strings and fragments are ignored, the extension is camel-cased and files without
/// an extension yield the empty kind.
pub fn asset_kind(file_name: &str) -> String {
  let path = file_name
    .split(['?', '#'])
    .next()
    .unwrap_or(file_name);
  let base = path.rsplit(['/', '\\']).next().unwrap_or(path);

  match base.rfind('.') {
    Some(0) | None => String::new(),
    Some(dot) => camel_case(&base[dot + 1..]),
  }
}

/// Camel-case `value`, treating `-`, `_`, `.` and spaces as word separators.
pub fn camel_case(value: &str) -> String {
  let mut result = String::with_capacity(value.len());

  for (index, word) in value
    .split(['-', '_', '.', ' '])
    .filter(|word| !word.is_empty())
    .enumerate()
  {
    let shouting = word.chars().all(|c| !c.is_lowercase());
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
      continue;
    };

    if index == 0 {
      result.extend(first.to_lowercase());
    } else {
      result.extend(first.to_uppercase());
    }
    if shouting {
      result.extend(chars.flat_map(char::to_lowercase));
    } else {
      result.extend(chars);
    }
  }

  result
}

#[cfg(test)]
mod tests {
  use super::{asset_kind, camel_case};

  #[test]
  fn uses_final_extension() {
    assert_eq!(asset_kind("main-abc123.js"), "js");
    assert_eq!(asset_kind("styles/site.min.css"), "css");
    assert_eq!(asset_kind("vendor-xyz.js.map"), "map");
  }

  #[test]
  fn unknown_extensions_pass_through() {
    assert_eq!(asset_kind("logo.png"), "png");
    assert_eq!(asset_kind("font.woff2"), "woff2");
  }

  #[test]
  fn strips_query_and_fragment() {
    assert_eq!(asset_kind("app.js?v=3"), "js");
    assert_eq!(asset_kind("icons.svg#sprite"), "svg");
  }

  #[test]
  fn files_without_extension_have_empty_kind() {
    assert_eq!(asset_kind("LICENSE"), "");
    assert_eq!(asset_kind(".htaccess"), "");
    assert_eq!(asset_kind("dir.v2/README"), "");
  }

  #[test]
  fn camel_cases_compound_extensions() {
    assert_eq!(asset_kind("icon.svg-inline"), "svgInline");
    assert_eq!(asset_kind("APP.JS"), "js");
    assert_eq!(camel_case("foo_bar-baz"), "fooBarBaz");
    assert_eq!(camel_case("fooBar"), "fooBar");
    assert_eq!(camel_case(""), "");
  }
}
