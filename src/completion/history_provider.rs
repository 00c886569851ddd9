//! History-based URL completion.
//!
//! A [`HistoryUrlProvider`] holds only configuration and a store handle.
//! Each call to [`HistoryUrlProvider::start`] runs a self-contained pass,
//! so overlapping passes never see each other's state.

use super::components;
use super::input::{is_standard_scheme, num_non_host_components, ClassifiedInput, InputType};
use super::prefix::UrlPrefix;
use super::provider::{AutocompleteMatch, AutocompleteProvider, HistoryMatch};
use crate::config;
use crate::history::{HistoryRow, HistoryStore};
use crate::time::ChromeTime;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use url::Url;

/// Which entry, if any, is forced into the default slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromoteType {
    WhatYouTypedMatch,
    FrontHistoryMatch,
    Neither,
}

/// Completes typed text against URLs in browsing history.
pub struct HistoryUrlProvider<S> {
    store: S,
    max_matches: usize,
}

impl<S: HistoryStore> HistoryUrlProvider<S> {
    pub fn new(store: S) -> Self {
        Self::with_max_matches(store, config::MAX_MATCHES_PER_PROVIDER)
    }

    pub fn with_max_matches(store: S, max_matches: usize) -> Self {
        Self { store, max_matches }
    }

    /// Run one pass as if the clock read `now`.
    pub fn start_at(&self, input: &ClassifiedInput, now: ChromeTime) -> Vec<AutocompleteMatch> {
        if input.is_empty() {
            return Vec::new();
        }

        let mut pass = HistoryUrlPass::new(input, self.max_matches, now);
        pass.do_autocomplete(&self.store);
        pass.query_complete()
    }
}

impl<S: HistoryStore + Send> AutocompleteProvider for HistoryUrlProvider<S> {
    fn start(&self, input: &ClassifiedInput) -> Vec<AutocompleteMatch> {
        self.start_at(input, ChromeTime::now())
    }
}

/// Working state for a single ranking pass.
struct HistoryUrlPass<'a> {
    input: &'a ClassifiedInput,
    /// Lowercased typed text; all lookups and offsets use this form
    lower_text: String,
    max_matches: usize,
    now: ChromeTime,
    /// Strip "http://" from display text unless the user typed a scheme
    trim_http: bool,
    matches: Vec<HistoryMatch>,
    have_what_you_typed_match: bool,
    what_you_typed_match: AutocompleteMatch,
    promote_type: PromoteType,
    /// When set, `matches[0]` is the row for exactly what was typed.
    exact_suggestion_is_in_history: bool,
}

impl<'a> HistoryUrlPass<'a> {
    fn new(input: &'a ClassifiedInput, max_matches: usize, now: ChromeTime) -> Self {
        let lower_text = input.text.to_lowercase();
        let trim_http = !lower_text.starts_with("http");

        Self {
            input,
            lower_text,
            max_matches,
            now,
            trim_http,
            matches: Vec::new(),
            have_what_you_typed_match: false,
            what_you_typed_match: what_you_typed_match(input),
            promote_type: PromoteType::Neither,
            exact_suggestion_is_in_history: false,
        }
    }

    fn do_autocomplete<S: HistoryStore>(&mut self, store: &S) {
        // Over-fetch so culling and promotion still leave enough to show.
        let max_rows = self.max_matches * 2;
        let lower_text = self.lower_text.as_str();

        self.matches = UrlPrefix::all()
            .par_iter()
            .flat_map_iter(|prefix| lookup_prefix(store, prefix, lower_text, max_rows))
            .collect();

        self.cull_poor_matches();
        sort_and_dedup_matches(&mut self.matches);
        log::debug!("{} history candidates for {:?}", self.matches.len(), self.input.text);

        // Offer what was typed when it is navigable and the user plausibly
        // meant something other than a search.
        self.have_what_you_typed_match = self.input.input_type != InputType::Query
            && (self.input.input_type != InputType::Unknown
                || !self.trim_http
                || num_non_host_components(&self.input.parts) > 0);

        let have_shorter_suggestion_for_inline = self.promote_or_create_shorter_suggestion(store);
        self.exact_suggestion_is_in_history = self.fixup_exact_suggestion(store);

        self.promote_type = if self.exact_suggestion_is_in_history {
            PromoteType::WhatYouTypedMatch
        } else if self
            .matches
            .first()
            .is_some_and(|top| have_shorter_suggestion_for_inline || can_promote_for_inline(top))
        {
            // Promoted even when inline autocomplete is prevented; the
            // what-you-typed match then supplies the default.
            PromoteType::FrontHistoryMatch
        } else if self.have_what_you_typed_match {
            PromoteType::WhatYouTypedMatch
        } else {
            PromoteType::Neither
        };
        log::debug!("Promote type for {:?}: {:?}", self.input.text, self.promote_type);

        let max_results = self.max_matches + usize::from(self.exact_suggestion_is_in_history);
        self.matches.truncate(max_results);
    }

    fn cull_poor_matches(&mut self) {
        let threshold = self.now.minus_days(config::LOW_QUALITY_MATCH_AGE_LIMIT_DAYS);
        self.matches
            .retain(|m| row_qualifies_as_significant(&m.row, threshold));
    }

    /// Try to put a shorter URL the top match extends at the front, e.g.
    /// "example.com" ahead of "example.com/docs/page".
    ///
    /// Returns true when a match was promoted that may be inline
    /// autocompleted.
    fn promote_or_create_shorter_suggestion<S: HistoryStore>(&mut self, store: &S) -> bool {
        let Some(top) = self.matches.first().cloned() else {
            return false;
        };

        // The base may itself be added unless it duplicates what was typed.
        let mut can_add_search_base = !self.have_what_you_typed_match;
        let search_base = match convert_to_host_only(&top, self.lower_text.len()) {
            Some(host) => {
                if !can_add_search_base {
                    can_add_search_base = host != self.what_you_typed_match.destination_url;
                }
                host
            }
            None => {
                // Cut the match itself down to what was typed; its prefix may
                // differ from the canonical input ("www." vs none).
                let end = (top.input_location + self.lower_text.len()).min(top.row.url.len());
                match top.row.url.get(..end) {
                    Some(base) if !base.is_empty() => base.to_string(),
                    _ => {
                        log::debug!("No search base for {}", top.row.url);
                        return false;
                    }
                }
            }
        };

        if search_base == top.row.url {
            return false;
        }

        // A shorter URL is only worth suggesting if it has been visited at
        // least a third as often as the longer one.
        let min_visits = (top.row.visit_count + 1).div_euclid(3) + 1;
        // Once the long URL was typed, only typed shorter URLs qualify.
        let min_typed = i64::from(top.row.typed_count > 0);

        let shortest = store
            .find_shortest_url_from_base(
                &search_base,
                &top.row.url,
                min_visits,
                min_typed,
                can_add_search_base,
            )
            .unwrap_or_else(|e| {
                log::warn!("Shortest URL lookup from {} failed: {}", search_base, e);
                None
            });

        let mut promote = true;
        let row = match shortest {
            Some(row) => row,
            None if !can_add_search_base => return false,
            None => {
                // Put the base on top only when the longer match is not good
                // enough to inline autocomplete.
                promote = top.row.typed_count <= 1;
                match store.row_for_url(&search_base) {
                    Ok(Some(row)) if !row.hidden => row,
                    Ok(_) => return false,
                    Err(e) => {
                        log::warn!("History lookup for {} failed: {}", search_base, e);
                        return false;
                    }
                }
            }
        };

        log::debug!("Shorter suggestion {} for {}", row.url, top.row.url);
        let ensure_can_inline = promote && can_promote_for_inline(&top);
        self.create_or_promote_match(row, &top, promote);
        ensure_can_inline
    }

    /// Make sure `row` is among the matches, moving it to the front when
    /// `promote` is set.
    fn create_or_promote_match(&mut self, row: HistoryRow, template: &HistoryMatch, promote: bool) {
        if let Some(i) = self.matches.iter().position(|m| m.row.url == row.url) {
            if promote {
                self.matches[..=i].rotate_right(1);
            }
            return;
        }

        let created = HistoryMatch {
            row,
            ..template.clone()
        };
        if promote {
            self.matches.insert(0, created);
        } else {
            self.matches.push(created);
        }
    }

    /// If exactly what was typed is a visible history row, fold that row into
    /// the what-you-typed match and move it to the front.
    fn fixup_exact_suggestion<S: HistoryStore>(&mut self, store: &S) -> bool {
        if !matches!(self.input.input_type, InputType::Url | InputType::Unknown) {
            return false;
        }
        let Some(canonical) = &self.input.canonical_url else {
            return false;
        };

        let row = match store.row_for_url(canonical.as_str()) {
            Ok(Some(row)) if !row.hidden => row,
            Ok(_) => return false,
            Err(e) => {
                log::warn!("History lookup for {} failed: {}", canonical, e);
                return false;
            }
        };

        self.what_you_typed_match.description = row.title.clone();
        self.what_you_typed_match.typed_count = row.typed_count;
        self.what_you_typed_match.deletable = row.visit_count > 0;

        let template = HistoryMatch {
            row: row.clone(),
            input_location: 0,
            match_in_scheme: false,
            match_in_subdomain: false,
            innermost_match: true,
        };
        self.create_or_promote_match(row, &template, true);
        true
    }

    /// Assemble the output list.
    fn query_complete(&self) -> Vec<AutocompleteMatch> {
        let mut results = Vec::with_capacity(self.matches.len() + 1);

        if self.promote_type != PromoteType::Neither {
            if self.promote_type == PromoteType::FrontHistoryMatch {
                if let Some(top) = self.matches.first() {
                    results.push(self.history_match_to_match(top, config::FRONT_HISTORY_RELEVANCE));
                }
            }

            // A front history match that cannot be default needs a
            // defaultable what-you-typed match beside it.
            let last_not_default = results.last().is_some_and(|m| !m.allowed_to_be_default_match);
            if self.promote_type == PromoteType::WhatYouTypedMatch
                || (last_not_default && self.have_what_you_typed_match)
            {
                if self.input.prevent_inline_autocomplete {
                    results.insert(0, self.what_you_typed_match.clone());
                } else {
                    results.push(self.what_you_typed_match.clone());
                }
            }
        }

        let first = usize::from(
            self.exact_suggestion_is_in_history
                || self.promote_type == PromoteType::FrontHistoryMatch,
        );
        let mut relevance = config::FIRST_HISTORY_RELEVANCE;
        for m in self.matches.iter().skip(first) {
            results.push(self.history_match_to_match(m, relevance));
            relevance -= 1;
        }

        results
    }

    fn history_match_to_match(&self, m: &HistoryMatch, relevance: i32) -> AutocompleteMatch {
        let row = &m.row;
        let mut display = match Url::parse(&row.url) {
            Ok(mut url) => {
                if !m.match_in_subdomain {
                    let bare = url
                        .host_str()
                        .and_then(|host| host.strip_prefix("www."))
                        .map(str::to_owned);
                    if let Some(bare) = bare {
                        if let Err(e) = url.set_host(Some(&bare)) {
                            log::debug!("Keeping www. on {}: {}", row.url, e);
                        }
                    }
                }
                String::from(url)
            }
            Err(_) => row.url.clone(),
        };

        if self.trim_http && !m.match_in_scheme {
            if let Some(rest) = ["http://", "https://", "//"]
                .iter()
                .find_map(|scheme| display.strip_prefix(scheme))
            {
                display = rest.to_string();
            }
        }
        if display.ends_with('/') {
            display.pop();
        }

        let mut result = AutocompleteMatch {
            destination_url: row.url.clone(),
            fill_into_edit: display.clone(),
            contents: display,
            description: row.title.clone(),
            relevance,
            typed_count: row.typed_count,
            deletable: row.visit_count > 0,
            ..AutocompleteMatch::default()
        };

        if !self.input.prevent_inline_autocomplete {
            if let Some(completion) = strip_prefix_ignore_ascii_case(&result.fill_into_edit, &self.input.text) {
                result.inline_autocompletion = completion.to_string();
                result.allowed_to_be_default_match = true;
            }
        }

        result
    }
}

fn what_you_typed_match(input: &ClassifiedInput) -> AutocompleteMatch {
    AutocompleteMatch {
        destination_url: input
            .canonical_url
            .as_ref()
            .map(|url| url.to_string())
            .unwrap_or_default(),
        fill_into_edit: input.text.clone(),
        contents: input.text.clone(),
        relevance: config::WHAT_YOU_TYPED_RELEVANCE,
        allowed_to_be_default_match: true,
        ..AutocompleteMatch::default()
    }
}

/// Fetch the rows for `prefix + lower_text` and wrap each in a candidate.
fn lookup_prefix<S: HistoryStore>(
    store: &S,
    prefix: &UrlPrefix,
    lower_text: &str,
    max_rows: usize,
) -> Vec<HistoryMatch> {
    let prefixed = format!("{}{}", prefix.prefix, lower_text);
    let rows = match store.autocomplete_for_prefix(&prefixed, max_rows, false) {
        Ok(rows) => rows,
        Err(e) => {
            log::warn!("History lookup for {:?} failed: {}", prefixed, e);
            return Vec::new();
        }
    };

    rows.into_iter()
        .filter_map(|row| {
            let Some(best) = UrlPrefix::best_match(&row.url.to_lowercase(), "") else {
                log::warn!("No URL prefix matches {}", row.url);
                return None;
            };
            let found = components::analyze(&row.url, &[(prefix.len(), prefixed.len())]);

            Some(HistoryMatch {
                input_location: prefix.len(),
                match_in_scheme: found.in_scheme,
                match_in_subdomain: found.in_subdomain,
                innermost_match: prefix.component_count >= best.component_count,
                row,
            })
        })
        .collect()
}

fn row_qualifies_as_significant(row: &HistoryRow, threshold: ChromeTime) -> bool {
    !row.hidden
        && (row.typed_count >= config::LOW_QUALITY_MATCH_TYPED_LIMIT
            || row.visit_count >= config::LOW_QUALITY_MATCH_VISIT_LIMIT
            || row.last_visit_time >= threshold)
}

/// Best first. Every key breaks ties in the one before it and the URL
/// settles the rest, so the order is total.
fn compare_quality(a: &HistoryMatch, b: &HistoryMatch) -> Ordering {
    let (ra, rb) = (&a.row, &b.row);

    (rb.typed_count > 0)
        .cmp(&(ra.typed_count > 0))
        .then_with(|| b.innermost_match.cmp(&a.innermost_match))
        .then_with(|| rb.typed_count.cmp(&ra.typed_count))
        .then_with(|| {
            // For URLs typed exactly once, a bare host beats a page inside it.
            if ra.typed_count == 1 {
                is_host_only(&rb.url).cmp(&is_host_only(&ra.url))
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| rb.visit_count.cmp(&ra.visit_count))
        .then_with(|| rb.last_visit_time.cmp(&ra.last_visit_time))
        .then_with(|| ra.url.cmp(&rb.url))
}

/// Sort by quality, then drop every later duplicate of a URL. Duplicates
/// need not be adjacent: "http" finds "http://http.com/" both behind
/// "http://" and behind the empty prefix, ranked differently.
fn sort_and_dedup_matches(matches: &mut Vec<HistoryMatch>) {
    matches.sort_by(compare_quality);

    let mut seen = HashSet::new();
    matches.retain(|m| seen.insert(m.row.url.clone()));
}

/// Whether `url` is nothing but a scheme and host.
pub fn is_host_only(url: &str) -> bool {
    Url::parse(url).is_ok_and(|url| {
        matches!(url.path(), "" | "/") && url.query().is_none() && url.fragment().is_none()
    })
}

/// Typed at least once, or simple enough that one visit is enough.
fn can_promote_for_inline(m: &HistoryMatch) -> bool {
    m.row.typed_count > 0 || is_host_only(&m.row.url)
}

/// The match's URL reduced to scheme and host, e.g.
/// "http://example.com/docs" becomes "http://example.com/".
fn convert_to_host_only(m: &HistoryMatch, typed_len: usize) -> Option<String> {
    let mut url = Url::parse(&m.row.url).ok()?;

    // No authority to suggest for opaque schemes, nor a useful one for files.
    if !is_standard_scheme(url.scheme()) || url.scheme() == "file" {
        return None;
    }

    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    let host = String::from(url);

    // The user typed past the host.
    if host.len() < m.input_location + typed_len {
        return None;
    }
    Some(host)
}

fn strip_prefix_ignore_ascii_case<'s>(text: &'s str, prefix: &str) -> Option<&'s str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::input::InputOptions;
    use crate::completion::scheme::KnownSchemeClassifier;
    use crate::history::{HistoryDatabase, HistoryError};
    use proptest::prelude::*;

    fn now() -> ChromeTime {
        ChromeTime(13_300_000_000_000_000)
    }

    fn row(url: &str, typed: i64, visits: i64) -> HistoryRow {
        HistoryRow {
            typed_count: typed,
            visit_count: visits,
            last_visit_time: now(),
            ..HistoryRow::new(url)
        }
    }

    fn old_row(url: &str, typed: i64, visits: i64) -> HistoryRow {
        HistoryRow {
            last_visit_time: now().minus_days(10),
            ..row(url, typed, visits)
        }
    }

    fn db_with(rows: &[HistoryRow]) -> HistoryDatabase {
        let db = HistoryDatabase::open_in_memory().unwrap();
        for r in rows {
            db.upsert_row(r).unwrap();
        }
        db
    }

    fn input(text: &str) -> ClassifiedInput {
        ClassifiedInput::new(text, InputOptions::default(), &KnownSchemeClassifier::default())
    }

    fn input_preventing_inline(text: &str) -> ClassifiedInput {
        let options = InputOptions {
            prevent_inline_autocomplete: true,
            ..InputOptions::default()
        };
        ClassifiedInput::new(text, options, &KnownSchemeClassifier::default())
    }

    fn run(db: &HistoryDatabase, input: &ClassifiedInput) -> Vec<AutocompleteMatch> {
        HistoryUrlProvider::new(db).start_at(input, now())
    }

    fn history_match(url: &str, typed: i64, visits: i64, last: i64, innermost: bool) -> HistoryMatch {
        HistoryMatch {
            row: HistoryRow {
                typed_count: typed,
                visit_count: visits,
                last_visit_time: ChromeTime(last),
                ..HistoryRow::new(url)
            },
            input_location: 7,
            match_in_scheme: false,
            match_in_subdomain: false,
            innermost_match: innermost,
        }
    }

    /// Serves rows from a database but fails lookups behind "https".
    struct FlakyStore(HistoryDatabase);

    impl HistoryStore for FlakyStore {
        fn autocomplete_for_prefix(
            &self,
            prefix: &str,
            max_results: usize,
            typed_only: bool,
        ) -> Result<Vec<HistoryRow>, HistoryError> {
            if prefix.starts_with("https") {
                return Err(HistoryError::Unavailable("disk is gone".into()));
            }
            self.0.autocomplete_for_prefix(prefix, max_results, typed_only)
        }

        fn find_shortest_url_from_base(
            &self,
            _base: &str,
            _url: &str,
            _min_visits: i64,
            _min_typed: i64,
            _allow_base: bool,
        ) -> Result<Option<HistoryRow>, HistoryError> {
            Err(HistoryError::Unavailable("disk is gone".into()))
        }

        fn row_for_url(&self, url: &str) -> Result<Option<HistoryRow>, HistoryError> {
            self.0.row_for_url(url)
        }
    }

    /// In-memory store that returns hidden rows from prefix lookups, so the
    /// pass itself has to keep them out.
    struct VecStore(Vec<HistoryRow>);

    impl HistoryStore for VecStore {
        fn autocomplete_for_prefix(
            &self,
            prefix: &str,
            max_results: usize,
            _typed_only: bool,
        ) -> Result<Vec<HistoryRow>, HistoryError> {
            let mut rows: Vec<HistoryRow> = self
                .0
                .iter()
                .filter(|r| r.url.starts_with(prefix))
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                b.typed_count
                    .cmp(&a.typed_count)
                    .then_with(|| b.visit_count.cmp(&a.visit_count))
                    .then_with(|| b.last_visit_time.cmp(&a.last_visit_time))
            });
            rows.truncate(max_results);
            Ok(rows)
        }

        fn find_shortest_url_from_base(
            &self,
            base: &str,
            url: &str,
            min_visits: i64,
            min_typed: i64,
            allow_base: bool,
        ) -> Result<Option<HistoryRow>, HistoryError> {
            Ok(self
                .0
                .iter()
                .filter(|r| if allow_base { r.url.as_str() >= base } else { r.url.as_str() > base })
                .filter(|r| r.url.as_str() < url && url.starts_with(r.url.as_str()))
                .filter(|r| !r.hidden && r.visit_count >= min_visits && r.typed_count >= min_typed)
                .min_by(|a, b| a.url.cmp(&b.url))
                .cloned())
        }

        fn row_for_url(&self, url: &str) -> Result<Option<HistoryRow>, HistoryError> {
            Ok(self.0.iter().find(|r| r.url == url).cloned())
        }
    }

    #[test]
    fn test_typed_host_becomes_default_with_inline_completion() {
        let db = db_with(&[
            row("http://example.com/", 3, 10),
            row("http://example.com/page", 0, 1),
        ]);

        let results = run(&db, &input("example"));
        assert_eq!(results.len(), 2);

        let top = &results[0];
        assert_eq!(top.destination_url, "http://example.com/");
        assert_eq!(top.contents, "example.com");
        assert_eq!(top.fill_into_edit, "example.com");
        assert_eq!(top.relevance, 1000);
        assert!(top.allowed_to_be_default_match);
        assert_eq!(top.inline_autocompletion, ".com");
        assert_eq!(top.typed_count, 3);
        assert!(top.deletable);

        assert_eq!(results[1].destination_url, "http://example.com/page");
        assert_eq!(results[1].contents, "example.com/page");
        assert_eq!(results[1].relevance, 999);
    }

    #[test]
    fn test_empty_and_query_input_yield_nothing() {
        let db = db_with(&[row("http://rust-lang.org/", 5, 5)]);

        assert!(run(&db, &input("   ")).is_empty());
        assert!(run(&db, &input("rust programming")).is_empty());
    }

    #[test]
    fn test_duplicate_urls_keep_higher_ranked_copy() {
        let db = db_with(&[
            row("http://http.com/", 0, 1),
            row("http://htaccess.com/", 0, 2),
        ]);

        let results = run(&db, &input("http"));
        let urls: Vec<_> = results.iter().map(|m| m.destination_url.as_str()).collect();
        assert_eq!(urls, vec!["http://http.com/", "http://htaccess.com/"]);

        // The surviving copy is the innermost match, found behind "http://".
        assert_eq!(results[0].relevance, 1000);
        assert_eq!(results[0].inline_autocompletion, "://http.com");
    }

    #[test]
    fn test_poor_matches_are_culled() {
        let db = db_with(&[
            old_row("http://old.com/", 0, 1),
            old_row("http://oldie.com/", 0, 4),
            old_row("http://oldest.com/", 1, 1),
        ]);

        let results = run(&db, &input("old"));
        let urls: Vec<_> = results.iter().map(|m| m.destination_url.as_str()).collect();
        assert_eq!(urls, vec!["http://oldest.com/", "http://oldie.com/"]);
    }

    #[test]
    fn test_recent_visit_survives_culling() {
        let recent = HistoryRow {
            last_visit_time: now().minus_days(2),
            ..row("http://fresh.com/", 0, 1)
        };
        let db = db_with(&[recent]);

        let results = run(&db, &input("fresh"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].contents, "fresh.com");
    }

    #[test]
    fn test_shorter_suggestion_rotated_to_front() {
        let db = db_with(&[
            row("http://example.com/docs/page", 2, 7),
            row("http://example.com/", 1, 4),
        ]);

        let results = run(&db, &input("exa"));
        let contents: Vec<_> = results.iter().map(|m| m.contents.as_str()).collect();
        assert_eq!(contents, vec!["example.com", "example.com/docs/page"]);
        assert_eq!(results[0].relevance, 1000);
        assert_eq!(results[0].inline_autocompletion, "mple.com");
    }

    #[test]
    fn test_shorter_suggestion_spliced_from_store() {
        // The host is culled from the candidates but still known to history.
        let db = db_with(&[
            old_row("http://example.com/docs/page", 0, 7),
            old_row("http://example.com/", 0, 3),
        ]);

        let results = run(&db, &input("exa"));
        let urls: Vec<_> = results.iter().map(|m| m.destination_url.as_str()).collect();
        assert_eq!(urls, vec!["http://example.com/", "http://example.com/docs/page"]);
        assert_eq!(results[0].relevance, 1000);
        assert_eq!(results[1].relevance, 999);
    }

    #[test]
    fn test_shorter_suggestion_needs_enough_visits() {
        // (7 - 1) / 3 + 1 = 3 visits required of the shorter URL, and the
        // bare host is not in history at all.
        let db = db_with(&[
            old_row("http://example.com/docs/page", 0, 7),
            old_row("http://example.com/docs/", 0, 2),
        ]);

        let results = run(&db, &input("exa"));
        let urls: Vec<_> = results.iter().map(|m| m.destination_url.as_str()).collect();
        assert_eq!(urls, vec!["http://example.com/docs/page"]);
        // Neither typed nor host-only, so nothing is promoted.
        assert_eq!(results[0].relevance, 999);
    }

    #[test]
    fn test_exact_input_in_history_is_promoted() {
        let mut exact = row("http://example.com/", 2, 5);
        exact.title = "Example Domain".into();
        let db = db_with(&[exact, row("http://example.com/a", 0, 5)]);

        let results = run(&db, &input("example.com"));
        assert_eq!(results.len(), 2);

        let top = &results[0];
        assert_eq!(top.destination_url, "http://example.com/");
        assert_eq!(top.contents, "example.com");
        assert_eq!(top.description, "Example Domain");
        assert_eq!(top.typed_count, 2);
        assert!(top.deletable);
        assert!(top.allowed_to_be_default_match);
        assert_eq!(top.relevance, 1000);

        assert_eq!(results[1].destination_url, "http://example.com/a");
        assert_eq!(results[1].relevance, 999);
    }

    #[test]
    fn test_prevented_inline_prepends_what_you_typed() {
        let db = db_with(&[row("http://example.com/", 1, 1)]);

        let results = run(&db, &input_preventing_inline("example.co"));
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].destination_url, "http://example.co/");
        assert_eq!(results[0].contents, "example.co");
        assert!(results[0].allowed_to_be_default_match);

        assert_eq!(results[1].destination_url, "http://example.com/");
        assert_eq!(results[1].relevance, 1000);
        assert!(!results[1].allowed_to_be_default_match);
        assert!(results[1].inline_autocompletion.is_empty());
    }

    #[test]
    fn test_url_input_without_history_offers_what_you_typed() {
        let db = db_with(&[]);

        let results = run(&db, &input("example.org/path"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].destination_url, "http://example.org/path");
        assert_eq!(results[0].fill_into_edit, "example.org/path");
        assert!(results[0].allowed_to_be_default_match);
        assert!(!results[0].deletable);
    }

    #[test]
    fn test_www_kept_only_when_typed() {
        let db = db_with(&[row("http://www.example.com/", 1, 1)]);

        let results = run(&db, &input("example"));
        assert_eq!(results[0].contents, "example.com");

        let results = run(&db, &input("www.ex"));
        assert_eq!(results[0].contents, "www.example.com");
        assert_eq!(results[0].inline_autocompletion, "ample.com");
    }

    #[test]
    fn test_scheme_kept_when_typed() {
        let db = db_with(&[row("https://example.com/", 1, 1)]);

        let results = run(&db, &input("https://exa"));
        assert_eq!(results[0].contents, "https://example.com");
        assert_eq!(results[0].inline_autocompletion, "mple.com");
    }

    #[test]
    fn test_output_bounded_and_relevance_decreasing() {
        let rows: Vec<_> = (0..8)
            .map(|i| row(&format!("http://site{i}.example.com/"), 0, 10 + i))
            .collect();
        let db = db_with(&rows);

        let results = run(&db, &input("site"));
        assert!(results.len() <= config::MAX_MATCHES_PER_PROVIDER + 1);

        let history: Vec<_> = results.iter().filter(|m| m.relevance < 1000).collect();
        for (i, m) in history.iter().enumerate() {
            assert_eq!(m.relevance, 999 - i as i32);
        }
        assert_eq!(results[0].relevance, 1000);
        assert_eq!(results[0].destination_url, "http://site7.example.com/");
    }

    #[test]
    fn test_hidden_exact_row_is_not_promoted() {
        let store = VecStore(vec![HistoryRow {
            title: "Example".into(),
            hidden: true,
            ..row("http://example.com/", 5, 10)
        }]);

        let results = HistoryUrlProvider::new(store).start_at(&input("example.com"), now());
        assert_eq!(results.len(), 1);

        let typed = &results[0];
        assert_eq!(typed.destination_url, "http://example.com/");
        assert_eq!(typed.description, "");
        assert_eq!(typed.typed_count, 0);
        assert!(!typed.deletable);
        assert_eq!(typed.relevance, 1000);
    }

    #[test]
    fn test_hidden_host_never_becomes_shorter_suggestion() {
        let store = VecStore(vec![
            row("http://example.com/docs/page", 0, 7),
            HistoryRow {
                hidden: true,
                ..row("http://example.com/", 3, 10)
            },
        ]);

        let results = HistoryUrlProvider::new(store).start_at(&input("exa"), now());
        let urls: Vec<&str> = results.iter().map(|m| m.destination_url.as_str()).collect();
        assert_eq!(urls, ["http://example.com/docs/page"]);
        assert_eq!(results[0].relevance, 999);
    }

    #[test]
    fn test_failed_lookups_skip_only_their_candidates() {
        let db = db_with(&[
            row("https://secure.com/", 1, 1),
            row("http://secret.com/", 1, 1),
        ]);
        let provider = HistoryUrlProvider::new(FlakyStore(db));

        let results = provider.start_at(&input("sec"), now());
        let urls: Vec<_> = results.iter().map(|m| m.destination_url.as_str()).collect();
        assert_eq!(urls, vec!["http://secret.com/"]);
    }

    #[test]
    fn test_compare_quality_keys() {
        let typed = history_match("http://b.com/x", 1, 1, 0, false);
        let untyped = history_match("http://a.com/", 0, 50, 9, true);
        assert_eq!(compare_quality(&typed, &untyped), Ordering::Less);

        let innermost = history_match("http://b.com/", 0, 1, 0, true);
        let outer = history_match("http://a.com/", 0, 9, 9, false);
        assert_eq!(compare_quality(&innermost, &outer), Ordering::Less);

        let host = history_match("http://b.com/", 1, 1, 0, true);
        let page = history_match("http://a.com/page", 1, 9, 9, true);
        assert_eq!(compare_quality(&host, &page), Ordering::Less);

        let twice_page = history_match("http://a.com/page", 2, 1, 0, true);
        let twice_host = history_match("http://b.com/", 2, 1, 0, true);
        assert_eq!(compare_quality(&twice_page, &twice_host), Ordering::Less);

        let recent = history_match("http://b.com/", 0, 1, 5, true);
        let stale = history_match("http://a.com/", 0, 1, 4, true);
        assert_eq!(compare_quality(&recent, &stale), Ordering::Less);
    }

    #[test]
    fn test_is_host_only() {
        assert!(is_host_only("http://example.com/"));
        assert!(is_host_only("https://example.com:8080"));
        assert!(!is_host_only("http://example.com/page"));
        assert!(!is_host_only("http://example.com/?q=1"));
        assert!(!is_host_only("not a url"));
    }

    #[test]
    fn test_convert_to_host_only() {
        let m = history_match("http://example.com/docs?q=1#top", 0, 1, 0, true);
        assert_eq!(convert_to_host_only(&m, 3).as_deref(), Some("http://example.com/"));

        // Typed past the host.
        assert_eq!(convert_to_host_only(&m, 20), None);

        let file = history_match("file:///etc/passwd", 0, 1, 0, true);
        assert_eq!(convert_to_host_only(&file, 1), None);

        let mail = history_match("mailto:me@example.com", 0, 1, 0, true);
        assert_eq!(convert_to_host_only(&mail, 1), None);
    }

    fn sample_matches() -> Vec<HistoryMatch> {
        vec![
            history_match("http://a.com/", 0, 3, 10, true),
            history_match("http://b.com/", 1, 1, 10, true),
            history_match("http://c.com/page", 1, 1, 10, true),
            history_match("http://d.com/", 2, 0, 0, false),
            history_match("http://e.com/", 0, 3, 10, false),
            history_match("http://f.com/", 0, 3, 11, true),
            history_match("http://g.com/", 0, 3, 10, true),
            history_match("http://h.com/x", 0, 7, 1, true),
        ]
    }

    proptest! {
        #[test]
        fn prop_sort_is_deterministic(shuffled in Just(sample_matches()).prop_shuffle()) {
            let mut expected = sample_matches();
            expected.sort_by(compare_quality);

            let mut actual = shuffled;
            actual.sort_by(compare_quality);
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_dedup_leaves_unique_urls(picks in proptest::collection::vec(0usize..8, 0..16)) {
            let pool = sample_matches();
            let mut matches: Vec<_> = picks.iter().map(|&i| pool[i].clone()).collect();
            sort_and_dedup_matches(&mut matches);

            let unique: HashSet<_> = matches.iter().map(|m| m.row.url.clone()).collect();
            prop_assert_eq!(unique.len(), matches.len());
        }
    }
}
