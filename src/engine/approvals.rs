//! The approval set: who currently approves the pull request.

use std::collections::HashMap;

use crate::github::ReviewEvent;

const APPROVED: &str = "approved";
const COMMENTED: &str = "commented";

/// Logins whose latest decisive review is an approval, most recent first.
///
/// Evaluators must only ask for membership; the order is informational.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalSet {
    logins: Vec<String>,
}

impl ApprovalSet {
    /// Build the set from raw review events.
    ///
    /// Comments never change a reviewer's decision. Of the remaining reviews
    /// only the one with the highest id per reviewer counts. With
    /// `count_author`, the pull request author is added in front.
    pub fn from_reviews(reviews: &[ReviewEvent], author: &str, count_author: bool) -> Self {
        let mut latest: HashMap<u64, &ReviewEvent> = HashMap::new();
        for review in reviews {
            if review.state.eq_ignore_ascii_case(COMMENTED) {
                continue;
            }
            match latest.get(&review.author_id) {
                Some(previous) if previous.review_id >= review.review_id => {}
                _ => {
                    latest.insert(review.author_id, review);
                }
            }
        }

        let mut approved: Vec<&ReviewEvent> = latest
            .into_values()
            .filter(|review| review.state.eq_ignore_ascii_case(APPROVED))
            .collect();
        approved.sort_by(|a, b| b.review_id.cmp(&a.review_id));

        let mut logins: Vec<String> = Vec::with_capacity(approved.len() + 1);
        for review in approved {
            crate::util::push_unique(&mut logins, &review.author_login);
        }

        if count_author && !logins.iter().any(|login| login == author) {
            logins.insert(0, author.to_string());
        }

        Self { logins }
    }

    pub fn from_logins(logins: &[&str]) -> Self {
        let mut set = Vec::new();
        for login in logins {
            crate::util::push_unique(&mut set, login);
        }
        Self { logins: set }
    }

    pub fn contains(&self, login: &str) -> bool {
        self.logins.iter().any(|l| l == login)
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }

    pub fn logins(&self) -> &[String] {
        &self.logins
    }
}
