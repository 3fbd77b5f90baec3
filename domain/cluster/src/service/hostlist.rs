/// Expand a compressed node-range expression into individual node names.
///
/// `node[01-03,05]` becomes `node01 node02 node03 node05`; the zero padding
/// of each range start is preserved for every generated name. A plain
/// comma-separated list passes through unchanged, and anything else is
/// treated as a single literal node name. Malformed range parts are skipped
/// rather than failing the whole expression.
pub fn expand(expr: &str) -> Vec<String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Vec::new();
    }

    if let Some((prefix, ranges)) = expr.strip_suffix(']').and_then(|e| e.split_once('[')) {
        let mut names = Vec::new();
        for part in ranges.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('-') {
                Some((start, end)) => {
                    let width = start.len();
                    let (Ok(lo), Ok(hi)) = (start.parse::<u64>(), end.parse::<u64>()) else {
                        continue;
                    };
                    for n in lo..=hi {
                        names.push(format!("{prefix}{n:0width$}"));
                    }
                }
                None => names.push(format!("{prefix}{part}")),
            }
        }
        return names;
    }

    if expr.contains(',') {
        return expr
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
    }

    vec![expr.to_string()]
}

#[cfg(test)]
mod tests {
    use super::expand;

    #[test]
    fn expands_ranges_preserving_zero_padding() {
        assert_eq!(
            expand("hgpn[01-03,05]"),
            vec!["hgpn01", "hgpn02", "hgpn03", "hgpn05"]
        );
    }

    #[test]
    fn keeps_padding_width_of_range_start() {
        assert_eq!(expand("n[008-010]"), vec!["n008", "n009", "n010"]);
    }

    #[test]
    fn plain_list_passes_through() {
        assert_eq!(expand("gpu01,gpu02"), vec!["gpu01", "gpu02"]);
    }

    #[test]
    fn single_name_is_literal() {
        assert_eq!(expand("login1"), vec!["login1"]);
    }

    #[test]
    fn malformed_range_parts_are_skipped() {
        assert_eq!(expand("n[01-xx,03]"), vec!["n03"]);
        assert!(expand("").is_empty());
    }
}
