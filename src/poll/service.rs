use std::sync::Arc;

use chrono::Utc;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::poll::model::{CreatePollRequest, Poll, PollResults, VoteConfirmation, VoteRequest};
use crate::poll::repository::PollRepository;

/// Business rules for the polling feature: input validation, the minimum
/// option count, duplicate-vote prevention and response shaping.
#[derive(Clone)]
pub struct PollService {
    repo: Arc<dyn PollRepository>,
}

impl PollService {
    pub fn new(repo: Arc<dyn PollRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_poll(
        &self,
        req: CreatePollRequest,
        caller: &AuthUser,
    ) -> Result<Poll, AppError> {
        let question = req.question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("question is required".into()));
        }
        if req.options.len() < 2 {
            return Err(AppError::Validation("a poll needs at least two options".into()));
        }
        self.repo.create(question, &req.options, caller.id).await
    }

    pub async fn get_poll(&self, id: i64) -> Result<Poll, AppError> {
        self.repo.get_by_id(id).await
    }

    pub async fn vote(
        &self,
        poll_id: i64,
        req: VoteRequest,
        caller: &AuthUser,
    ) -> Result<VoteConfirmation, AppError> {
        if req.option_id == 0 {
            return Err(AppError::Validation("option_id is required".into()));
        }
        self.repo.record_vote(poll_id, req.option_id, caller.id).await?;
        Ok(VoteConfirmation {
            message: "vote recorded",
            poll_id,
            option_id: req.option_id,
            timestamp: Utc::now(),
        })
    }

    pub async fn results(&self, poll_id: i64) -> Result<PollResults, AppError> {
        let poll = self.repo.get_by_id(poll_id).await?;
        let options = self.repo.results(poll_id).await?;
        let total_votes = options.iter().map(|o| o.votes.unwrap_or(0)).sum();
        Ok(PollResults {
            poll_id: poll.id,
            question: poll.question,
            total_votes,
            created_at: poll.created_at,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::poll::model::PollOption;

    #[derive(Default)]
    struct MockPollRepo {
        polls: Mutex<Vec<Poll>>,
        // (poll_id, option_id, user_id)
        votes: Mutex<Vec<(i64, i64, i64)>>,
    }

    #[async_trait]
    impl PollRepository for MockPollRepo {
        async fn create(
            &self,
            question: &str,
            options: &[String],
            user_id: i64,
        ) -> Result<Poll, AppError> {
            let mut polls = self.polls.lock().unwrap();
            let id = polls.len() as i64 + 1;
            let poll = Poll {
                id,
                question: question.to_string(),
                user_id,
                created_at: Utc::now(),
                options: options
                    .iter()
                    .enumerate()
                    .map(|(i, text)| PollOption {
                        id: id * 100 + i as i64 + 1,
                        poll_id: id,
                        text: text.clone(),
                        votes: None,
                    })
                    .collect(),
            };
            polls.push(poll.clone());
            Ok(poll)
        }

        async fn get_by_id(&self, id: i64) -> Result<Poll, AppError> {
            self.polls
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("poll not found".into()))
        }

        async fn record_vote(
            &self,
            poll_id: i64,
            option_id: i64,
            user_id: i64,
        ) -> Result<(), AppError> {
            let mut votes = self.votes.lock().unwrap();
            if votes.iter().any(|(p, _, u)| *p == poll_id && *u == user_id) {
                return Err(AppError::Conflict("already voted".into()));
            }
            votes.push((poll_id, option_id, user_id));
            Ok(())
        }

        async fn has_voted(&self, poll_id: i64, user_id: i64) -> Result<bool, AppError> {
            Ok(self
                .votes
                .lock()
                .unwrap()
                .iter()
                .any(|(p, _, u)| *p == poll_id && *u == user_id))
        }

        async fn results(&self, poll_id: i64) -> Result<Vec<PollOption>, AppError> {
            let poll = self.get_by_id(poll_id).await?;
            let votes = self.votes.lock().unwrap();
            Ok(poll
                .options
                .into_iter()
                .map(|mut option| {
                    let count = votes.iter().filter(|(_, o, _)| *o == option.id).count();
                    option.votes = Some(count as i64);
                    option
                })
                .collect())
        }
    }

    fn service() -> PollService {
        PollService::new(Arc::new(MockPollRepo::default()))
    }

    fn caller(id: i64) -> AuthUser {
        AuthUser {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
        }
    }

    fn create_req(question: &str, options: &[&str]) -> CreatePollRequest {
        CreatePollRequest {
            question: question.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_populates_ids_and_back_references() {
        let svc = service();
        let poll = svc
            .create_poll(create_req("Pick a color", &["Red", "Blue"]), &caller(1))
            .await
            .unwrap();
        assert_ne!(poll.id, 0);
        assert_eq!(poll.user_id, 1);
        assert_eq!(poll.options.len(), 2);
        for option in &poll.options {
            assert_ne!(option.id, 0);
            assert_eq!(option.poll_id, poll.id);
        }
    }

    #[tokio::test]
    async fn create_rejects_empty_question() {
        let svc = service();
        let err = svc
            .create_poll(create_req("   ", &["Red", "Blue"]), &caller(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // Nothing was persisted.
        assert!(matches!(svc.get_poll(1).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_rejects_fewer_than_two_options() {
        let svc = service();
        let err = svc
            .create_poll(create_req("Pick a color", &["Red"]), &caller(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn read_your_write_after_create() {
        let svc = service();
        let created = svc
            .create_poll(create_req("Pick a color", &["Red", "Blue"]), &caller(1))
            .await
            .unwrap();
        let fetched = svc.get_poll(created.id).await.unwrap();
        assert_eq!(fetched.question, "Pick a color");
        let texts: Vec<_> = fetched.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["Red", "Blue"]);
    }

    #[tokio::test]
    async fn vote_requires_option_id() {
        let svc = service();
        let err = svc
            .vote(1, VoteRequest { option_id: 0 }, &caller(3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn second_vote_by_same_user_conflicts() {
        let svc = service();
        let poll = svc
            .create_poll(create_req("Pick a color", &["Red", "Blue"]), &caller(1))
            .await
            .unwrap();
        let option_id = poll.options[0].id;

        let confirmation = svc
            .vote(poll.id, VoteRequest { option_id }, &caller(3))
            .await
            .unwrap();
        assert_eq!(confirmation.poll_id, poll.id);
        assert_eq!(confirmation.option_id, option_id);

        let err = svc
            .vote(poll.id, VoteRequest { option_id: poll.options[1].id }, &caller(3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // The conflicting attempt wrote nothing: the totals still show one vote.
        let results = svc.results(poll.id).await.unwrap();
        assert_eq!(results.total_votes, 1);
    }

    #[tokio::test]
    async fn results_total_equals_sum_of_option_counts() {
        let svc = service();
        let poll = svc
            .create_poll(create_req("Pick a color", &["Red", "Blue"]), &caller(1))
            .await
            .unwrap();
        svc.vote(poll.id, VoteRequest { option_id: poll.options[0].id }, &caller(3))
            .await
            .unwrap();

        let results = svc.results(poll.id).await.unwrap();
        assert_eq!(results.question, "Pick a color");
        assert_eq!(results.options[0].votes, Some(1));
        assert_eq!(results.options[1].votes, Some(0));
        assert_eq!(
            results.total_votes,
            results.options.iter().map(|o| o.votes.unwrap_or(0)).sum::<i64>()
        );
        assert_eq!(results.total_votes, 1);
    }

    #[tokio::test]
    async fn has_voted_flips_after_recording() {
        let repo = Arc::new(MockPollRepo::default());
        let svc = PollService::new(repo.clone());
        let poll = svc
            .create_poll(create_req("Pick a color", &["Red", "Blue"]), &caller(1))
            .await
            .unwrap();

        assert!(!repo.has_voted(poll.id, 3).await.unwrap());
        svc.vote(poll.id, VoteRequest { option_id: poll.options[0].id }, &caller(3))
            .await
            .unwrap();
        assert!(repo.has_voted(poll.id, 3).await.unwrap());
    }
}
