use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::{OffsetDateTime, format_description};
use tracing::warn;

use crate::infra::GameObserver;
use crate::planners::{Plan, PlanError};
use crate::program::{BasicCommand, StepOutcome};
use crate::state::{Level, Session};

/// Text record of one run: the level map, then one letter per command.
///
/// Files are named `<user> - <YYYYMMDD-HHMMSS> - <seed>.plan`; hand-made levels
/// use `custom` in place of the seed.
pub struct ReplayFile {
    path: PathBuf,
    file: File,
}

impl ReplayFile {
    pub fn new(replays_folder: &str, user_name: &str, level: &Level) -> io::Result<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let format = format_description::parse("[year][month][day]-[hour][minute][second]")
            .map_err(io::Error::other)?;
        let date_time_str = now.format(&format).map_err(io::Error::other)?;
        let seed = level
            .seed
            .map_or_else(|| "custom".to_string(), |seed| seed.to_string());

        let path = Path::new(replays_folder)
            .join(format!("{} - {} - {}.plan", user_name, date_time_str, seed));

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        let mut replay_file = ReplayFile { path, file };
        replay_file.write_header(user_name, &seed, level)?;
        Ok(replay_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_header(&mut self, user_name: &str, seed: &str, level: &Level) -> io::Result<()> {
        writeln!(self.file, "user: {}", user_name)?;
        writeln!(self.file, "seed: {}", seed)?;
        writeln!(self.file, "size: {}x{}", level.grid.width, level.grid.height)?;
        writeln!(self.file, "map:")?;
        write!(self.file, "{}", level.grid.to_ascii())?;
        write!(self.file, "actions: ")?;
        Ok(())
    }

    fn append(&mut self, command: BasicCommand) -> io::Result<()> {
        write!(self.file, "{}", command.letter())
    }

    fn write_result(&mut self, session: &Session) -> io::Result<()> {
        writeln!(self.file)?;
        writeln!(
            self.file,
            "result: {}, coins {}/{}, moves {}",
            if session.is_won() { "won" } else { "not won" },
            session.collected_coins,
            session.total_coins,
            session.steps
        )?;
        self.file.flush()
    }

    fn report(&self, result: io::Result<()>) {
        if let Err(e) = result {
            warn!("Failed to write replay {}: {}", self.path.display(), e);
        }
    }
}

impl GameObserver for ReplayFile {
    fn on_level_start(&mut self, _level: &Level) {}

    fn on_plan_ready(&mut self, _plan: &Plan) {}

    fn on_plan_failed(&mut self, _error: &PlanError) {}

    fn on_action_applied(
        &mut self,
        _step: usize,
        command: BasicCommand,
        _outcome: StepOutcome,
        _session: &Session,
    ) {
        let result = self.append(command);
        self.report(result);
    }

    fn on_finished(&mut self, session: &Session) {
        let result = self.write_result(session);
        self.report(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Action;
    use crate::program::execute;

    #[test]
    fn test_replay_records_map_and_letters() {
        let folder = std::env::temp_dir().join(format!("robolearn-replay-{}", std::process::id()));
        let folder = folder.to_string_lossy().to_string();
        let level = Level::parse("S.CG\n").unwrap();

        let mut replay = ReplayFile::new(&folder, "tester", &level).unwrap();
        let mut session = Session::new(&level, true);
        for (step, action) in [Action::MoveForward, Action::MoveForward, Action::MoveForward]
            .into_iter()
            .enumerate()
        {
            let command = BasicCommand::from(action);
            let outcome = execute(&mut session, command);
            replay.on_action_applied(step + 1, command, outcome, &session);
        }
        replay.on_finished(&session);

        let path = replay.path().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("tester - "));
        assert!(name.ends_with(" - custom.plan"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("map:\nS.CG\n"));
        assert!(text.contains("actions: FFF\n"));
        assert!(text.contains("result: won, coins 1/1, moves 3"));

        let _ = std::fs::remove_dir_all(&folder);
    }
}
