// session.rs - Score bookkeeping that outlives a single attempt.
// A session lasts for the whole process: best score survives restarts and
// trips back to the main menu, but nothing is written to disk.

/// Score state for the running process.
///
/// `best_score` is the running maximum of `score`, so it can only go up.
/// `score` goes back to zero only through `begin_attempt`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSession {
    pub score: u32,
    pub best_score: u32,
    /// Guards the looping background track so it is started at most once.
    pub background_music_played: bool,
}

impl RunSession {
    /// Starts a fresh attempt. The best score is kept.
    pub fn begin_attempt(&mut self) {
        self.score = 0;
    }

    /// Adds points to the current attempt and raises the best score if needed.
    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.record_best();
    }

    /// Folds the current score into the best score. Returns true on a new record.
    pub fn record_best(&mut self) -> bool {
        if self.score > self.best_score {
            self.best_score = self.score;
            true
        } else {
            false
        }
    }

    /// Flips the music guard. Returns true if the caller should actually start
    /// the track (i.e. it was not already playing).
    pub fn claim_music(&mut self) -> bool {
        if self.background_music_played {
            false
        } else {
            self.background_music_played = true;
            true
        }
    }

    /// Clears the music guard. Returns true if a track was marked as playing.
    pub fn release_music(&mut self) -> bool {
        std::mem::replace(&mut self.background_music_played, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_attempt_keeps_best() {
        let mut session = RunSession::default();
        session.award(11);
        session.begin_attempt();
        assert_eq!(session.score, 0);
        assert_eq!(session.best_score, 11);
    }

    #[test]
    fn test_best_never_decreases() {
        let mut session = RunSession::default();
        let attempts: [&[u32]; 4] = [&[1, 10], &[1], &[10, 10, 1], &[]];
        let mut previous_best = 0;
        for awards in attempts {
            session.begin_attempt();
            for &points in awards {
                session.award(points);
            }
            session.record_best();
            assert!(session.best_score >= previous_best);
            assert!(session.best_score >= session.score);
            previous_best = session.best_score;
        }
        assert_eq!(session.best_score, 21);
    }

    #[test]
    fn test_music_guard_is_idempotent() {
        let mut session = RunSession::default();
        assert!(session.claim_music());
        assert!(!session.claim_music());
        assert!(session.release_music());
        assert!(!session.release_music());
        assert!(session.claim_music());
    }
}
