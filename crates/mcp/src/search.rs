//! Term scoring over cached conversation summaries.
//!
//! Queries match against what a session *accomplished*: the final todo
//! list when the session has one, the user-message arc otherwise. Scoring
//! is deliberately simple, one point per query term per candidate text
//! containing it.

use hindsight_core::{ConversationRecord, SearchResult};

/// Score every record against `query` and return the top `limit` hits.
///
/// Terms are the lowercased whitespace-separated words of the query;
/// matching is case-insensitive substring containment. Ties are broken by
/// the record timestamp, most recent first.
pub fn search<'a, I>(
    records: I,
    query: &str,
    limit: usize,
    project: Option<&str>,
) -> Vec<SearchResult>
where
    I: IntoIterator<Item = &'a ConversationRecord>,
{
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = records
        .into_iter()
        .filter(|record| project.is_none_or(|p| record.project == p))
        .filter_map(|record| score_record(record, &terms))
        .collect();
    results.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
    results.truncate(limit);
    results
}

fn score_record(record: &ConversationRecord, terms: &[String]) -> Option<SearchResult> {
    let mut score = 0u32;
    let mut matched_todos = Vec::new();
    let mut matched_user_messages = Vec::new();

    if !record.final_todos.is_empty() {
        let todos = &record.final_todos;
        for text in todos
            .completed
            .iter()
            .chain(&todos.in_progress)
            .chain(&todos.pending)
        {
            if let Some(hits) = term_hits(text, terms) {
                score += hits;
                matched_todos.push(text.clone());
            }
        }
    } else {
        for text in &record.user_message_arc {
            if let Some(hits) = term_hits(text, terms) {
                score += hits;
                matched_user_messages.push(text.clone());
            }
        }
    }

    if score == 0 {
        return None;
    }
    Some(SearchResult {
        session_id: record.session_id.clone(),
        score,
        matched_todos,
        matched_user_messages,
        summary: record.summary(),
        project: record.project.clone(),
        timestamp: record.timestamp.clone(),
    })
}

/// Number of distinct terms contained in `text`, if any.
fn term_hits(text: &str, terms: &[String]) -> Option<u32> {
    let lower = text.to_lowercase();
    let hits = terms
        .iter()
        .filter(|term| lower.contains(term.as_str()))
        .count() as u32;
    (hits > 0).then_some(hits)
}
