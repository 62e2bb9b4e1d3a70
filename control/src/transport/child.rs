use super::Transport;

use crate::error::{Error, Result};
use crate::protocol::{Reply, Request};
use crate::types::{BoardState, MoveDesc, PromotionPiece, Side, Square, TerminalStatus};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use engine::Limits;
use log::{debug, error, trace, warn};

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{self, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// A state-changing command that timed out. The child may still carry it out, so the next call
/// compares boards before anything else is sent.
#[derive(Clone, Debug)]
enum Unsettled {
    Move(MoveDesc),
    BotMove { side: Side, before: BoardState },
}

/// How long a child gets to exit by itself after `quit` before it is killed.
const QUIT_GRACE: Duration = Duration::from_millis(200);

/// A line-protocol session with an engine running as a child process.
///
/// A dedicated reader thread pushes every non-empty line of the child's output onto a channel. The
/// transport writes one command, then pops exactly one line with a bounded wait; at most one
/// command is ever outstanding.
pub struct Child {
    program: String,
    process: Option<process::Child>,
    stdin: Option<BufWriter<ChildStdin>>,
    replies: Receiver<String>,
    timeout: Duration,
    /// The move the child already applied while answering `botMove`.
    pre_applied: Option<MoveDesc>,
    /// A request that timed out; the first line that answers it is dropped.
    late: Option<Request>,
    unsettled: Option<Unsettled>,
    /// An engine move the child made after its `botMove` timed out, not yet reported.
    unreported: Option<MoveDesc>,
}

impl Child {
    /// Start the engine executable at `path`.
    pub fn spawn(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        Self::with_command(Command::new(path.as_ref()), timeout)
    }

    /// Start an engine from a prepared command. Its standard input and output are replaced by
    /// pipes.
    pub fn with_command(mut command: Command, timeout: Duration) -> Result<Self> {
        let program = command.get_program().to_string_lossy().into_owned();
        let spawn_error = |source| Error::Spawn {
            path: program.clone(),
            source,
        };

        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let (stdin, stdout) = match (process.stdin.take(), process.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(spawn_error(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "engine pipes unavailable",
                )));
            }
        };

        let (tx, rx) = unbounded::<String>();
        let reader = thread::Builder::new()
            .name("engine-reader".to_string())
            .spawn(move || read_replies(stdout, tx));
        if let Err(err) = reader {
            let _ = process.kill();
            let _ = process.wait();
            return Err(spawn_error(err));
        }

        debug!("started engine `{}` (pid {})", program, process.id());
        Ok(Self {
            program: program.clone(),
            process: Some(process),
            stdin: Some(BufWriter::new(stdin)),
            replies: rx,
            timeout,
            pre_applied: None,
            late: None,
            unsettled: None,
            unreported: None,
        })
    }

    /// Whether the child is still available. A fatal failure makes this permanently false.
    pub fn is_usable(&self) -> bool {
        self.stdin.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Write one request and wait for its single reply line.
    fn round_trip(&mut self, request: &Request) -> Result<Reply> {
        let command = request.to_string();
        self.send(&command)?;

        let deadline = Instant::now() + self.timeout;
        loop {
            match self.replies.recv_deadline(deadline) {
                Ok(line) => {
                    debug!("< {}", line);
                    if self.skip_late(&line) {
                        continue;
                    }
                    return match Reply::parse_for(request, &line) {
                        Some(reply) => Ok(reply),
                        None => {
                            error!("reply `{}` does not answer `{}`", line, command);
                            self.terminate();
                            Err(Error::Desync {
                                command,
                                reply: line,
                            })
                        }
                    };
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("no reply to `{}` within {:?}", command, self.timeout);
                    self.late = Some(request.clone());
                    return Err(Error::NoResponse {
                        command,
                        timeout: self.timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(
                        self.fail(format!("engine output closed while waiting for `{}`", command))
                    );
                }
            }
        }
    }

    /// Drop `line` if it answers the request that last timed out. Replies come in order, so any
    /// other line means that answer is never coming.
    fn skip_late(&mut self, line: &str) -> bool {
        match self.late.take() {
            Some(late) if Reply::parse_for(&late, line).is_some() => {
                warn!("discarding late reply `{}` to `{}`", line, late);
                true
            }
            _ => false,
        }
    }

    fn send(&mut self, command: &str) -> Result<()> {
        // A reply that arrived after its request timed out must not answer this one.
        let stale: Vec<String> = self.replies.try_iter().collect();
        for line in stale {
            if !self.skip_late(&line) {
                warn!("discarding stale reply `{}`", line);
            }
        }

        let stdin = self.stdin.as_mut().ok_or(Error::Unusable)?;
        debug!("> {}", command);
        let written = writeln!(stdin, "{}", command).and_then(|_| stdin.flush());
        match written {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(format!("writing `{}` failed: {}", command, err))),
        }
    }

    /// Tear the child down after a fatal failure.
    fn fail(&mut self, reason: String) -> Error {
        error!("{}", reason);
        self.terminate();
        Error::Disconnected(reason)
    }

    /// Kill the child if it is still running and mark the transport unusable.
    fn terminate(&mut self) {
        self.stdin = None;
        self.pre_applied = None;
        self.unsettled = None;
        self.unreported = None;
        if let Some(mut process) = self.process.take() {
            match process.try_wait() {
                Ok(Some(status)) => debug!("engine `{}` already exited: {}", self.program, status),
                _ => {
                    if let Err(err) = process.kill() {
                        warn!("failed to kill engine `{}`: {}", self.program, err);
                    }
                    let _ = process.wait();
                }
            }
        }
    }

    /// Kill the child and report that it no longer agrees with the session.
    fn desync(&mut self, command: String, reply: String) -> Error {
        error!("engine out of step after `{}`: {}", command, reply);
        self.terminate();
        Error::Desync { command, reply }
    }

    fn fetch_board(&mut self) -> Result<BoardState> {
        match self.round_trip(&Request::FetchState)? {
            Reply::State(board) => Ok(board),
            reply => Err(self.unexpected(&Request::FetchState, &reply)),
        }
    }

    /// Find out whether a timed-out `move` or `botMove` was carried out after all.
    ///
    /// A human move the child applied is acknowledged by the next commit of that same move. An
    /// engine move it applied is handed out by the next `search_best_move`. A board that fits
    /// neither outcome is a desync.
    fn reconcile(&mut self) -> Result<()> {
        let unsettled = match self.unsettled.take() {
            Some(unsettled) => unsettled,
            None => return Ok(()),
        };
        let board = match self.fetch_board() {
            Ok(board) => board,
            Err(err) => {
                if err.is_transient() {
                    self.unsettled = Some(unsettled);
                }
                return Err(err);
            }
        };

        match unsettled {
            Unsettled::Move(mov) => {
                if mov.side.owns(board.piece_at(mov.from)) {
                    debug!("{} was not applied", mov.coordinate());
                } else if mov.side.owns(board.piece_at(mov.to)) {
                    debug!("{} was applied after it timed out", mov.coordinate());
                    self.pre_applied = Some(mov);
                } else {
                    return Err(self.desync(
                        format!("move {}", mov.coordinate()),
                        format!("board {}", board),
                    ));
                }
            }
            Unsettled::BotMove { side, before } => {
                if board == before {
                    debug!("engine did not move for {}", side);
                } else if let Some((from, to)) = infer_move(&before, &board, side) {
                    let mov = describe(&before, from, to, side);
                    debug!("engine played {} after its turn timed out", mov.coordinate());
                    self.unreported = Some(mov);
                } else {
                    return Err(self.desync(
                        Request::BotMove.to_string(),
                        format!("board {}", board),
                    ));
                }
            }
        }
        Ok(())
    }

    fn unexpected(&mut self, request: &Request, reply: &Reply) -> Error {
        self.desync(request.to_string(), reply.to_string())
    }
}

impl Transport for Child {
    fn initialize(&mut self, human: Side) -> Result<()> {
        self.pre_applied = None;
        self.unsettled = None;
        self.unreported = None;
        match self.round_trip(&Request::Init(human))? {
            Reply::InitSuccess => Ok(()),
            reply => Err(self.unexpected(&Request::Init(human), &reply)),
        }
    }

    fn legal_moves(&mut self, side: Side, origin: Square) -> Result<Vec<MoveDesc>> {
        self.reconcile()?;
        let request = Request::GetMoves(origin);
        match self.round_trip(&request)? {
            Reply::Moves(squares) => Ok(squares
                .into_iter()
                .map(|to| MoveDesc::new(origin, to, side))
                .collect()),
            reply => Err(self.unexpected(&request, &reply)),
        }
    }

    fn commit(&mut self, mov: &MoveDesc) -> Result<String> {
        self.reconcile()?;
        if let Some(applied) = self.pre_applied.take() {
            if applied.connects(mov.from, mov.to) {
                trace!("{} already applied by the engine", applied.coordinate());
                return Ok(mov.coordinate());
            }
            return Err(self.desync(
                format!("move {}", mov.coordinate()),
                format!("engine already played {}", applied.coordinate()),
            ));
        }
        if let Some(played) = self.unreported.take() {
            return Err(self.desync(
                format!("move {}", mov.coordinate()),
                format!("engine already played {}", played.coordinate()),
            ));
        }

        let request = Request::Move(mov.from, mov.to);
        match self.round_trip(&request) {
            Ok(Reply::MoveMade) => Ok(mov.coordinate()),
            Ok(Reply::InvalidMove) => Err(Error::IllegalMove {
                from: mov.from,
                to: mov.to,
            }),
            Ok(reply) => Err(self.unexpected(&request, &reply)),
            Err(err) => {
                if err.is_transient() {
                    self.unsettled = Some(Unsettled::Move(mov.clone()));
                }
                Err(err)
            }
        }
    }

    fn search_best_move(&mut self, side: Side, limits: &Limits) -> Result<(MoveDesc, String)> {
        trace!(
            "engine process picks its own limits, ignoring depth {} and {:?}",
            limits.max_depth,
            limits.max_time
        );
        self.reconcile()?;
        if let Some(mov) = self.unreported.take() {
            self.pre_applied = Some(mov.clone());
            return Ok((mov, String::new()));
        }

        let before = self.fetch_board()?;
        let pending = Unsettled::BotMove {
            side,
            before: before.clone(),
        };

        let (from, to) = match self.round_trip(&Request::BotMove) {
            Ok(Reply::BotMoved(Some(squares))) => squares,
            Ok(Reply::BotMoved(None)) => {
                let after = match self.fetch_board() {
                    Ok(after) => after,
                    Err(err) => {
                        if err.is_transient() {
                            self.unsettled = Some(pending);
                        }
                        return Err(err);
                    }
                };
                match infer_move(&before, &after, side) {
                    Some(squares) => squares,
                    None => {
                        return Err(self.desync(
                            Request::BotMove.to_string(),
                            format!("botMoved, board {}", after),
                        ))
                    }
                }
            }
            Ok(reply) => return Err(self.unexpected(&Request::BotMove, &reply)),
            Err(err) => {
                if err.is_transient() {
                    self.unsettled = Some(pending);
                }
                return Err(err);
            }
        };

        if !side.owns(before.piece_at(from)) {
            return Err(self.desync(
                Request::BotMove.to_string(),
                format!("botMoved {} {} moves no {} piece", from.index(), to.index(), side),
            ));
        }

        let mov = describe(&before, from, to, side);
        debug!("engine played {}", mov.coordinate());
        self.pre_applied = Some(mov.clone());
        Ok((mov, String::new()))
    }

    fn terminal_status(&mut self, _side: Side) -> Result<TerminalStatus> {
        self.reconcile()?;
        match self.round_trip(&Request::IsMate) {
            Ok(Reply::Status(status)) => Ok(status),
            Ok(reply) => Err(self.unexpected(&Request::IsMate, &reply)),
            // Engines that print nothing while the game goes on.
            Err(Error::NoResponse { .. }) => Ok(TerminalStatus::None),
            Err(err) => Err(err),
        }
    }

    fn board(&mut self) -> Result<BoardState> {
        self.reconcile()?;
        self.fetch_board()
    }

    fn shutdown(&mut self) {
        if self.process.is_none() {
            return;
        }
        if self.send(&Request::Quit.to_string()).is_ok() {
            // Closing stdin lets engines that wait on EOF exit too.
            self.stdin = None;
            let deadline = Instant::now() + QUIT_GRACE;
            while Instant::now() < deadline {
                match self.process.as_mut().map(|p| p.try_wait()) {
                    Some(Ok(Some(status))) => {
                        debug!("engine `{}` exited: {}", self.program, status);
                        self.process = None;
                        return;
                    }
                    Some(Ok(None)) => thread::sleep(Duration::from_millis(10)),
                    _ => break,
                }
            }
        }
        self.terminate();
    }
}

impl Drop for Child {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The reader thread body: forward every non-empty line until the child's output closes.
fn read_replies(stdout: ChildStdout, tx: Sender<String>) {
    let reader = BufReader::new(stdout);
    for line in reader.lines() {
        match line {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if tx.send(line.to_string()).is_err() {
                    break;
                }
            }
            Err(err) => {
                debug!("engine output unreadable: {}", err);
                break;
            }
        }
    }
    trace!("engine reader finished");
}

/// Recover the move `side` made from the boards before and after it. A king that moved names the
/// move, which covers castling; otherwise exactly one square must have been vacated and one
/// occupied.
pub(crate) fn infer_move(
    before: &BoardState,
    after: &BoardState,
    side: Side,
) -> Option<(Square, Square)> {
    let king = if side.is_white() { 'K' } else { 'k' };

    let king_from =
        Square::all().find(|&sq| before.piece_at(sq) == king && after.piece_at(sq) != king);
    let king_to =
        Square::all().find(|&sq| after.piece_at(sq) == king && before.piece_at(sq) != king);
    if let (Some(from), Some(to)) = (king_from, king_to) {
        return Some((from, to));
    }

    let vacated: Vec<Square> = Square::all()
        .filter(|&sq| side.owns(before.piece_at(sq)) && !side.owns(after.piece_at(sq)))
        .collect();
    let arrived: Vec<Square> = Square::all()
        .filter(|&sq| side.owns(after.piece_at(sq)) && before.piece_at(sq) != after.piece_at(sq))
        .collect();

    match (vacated.as_slice(), arrived.as_slice()) {
        ([from], [to]) => Some((*from, *to)),
        _ => None,
    }
}

/// Describe a move the engine made, using the board it was made on.
fn describe(before: &BoardState, from: Square, to: Square, side: Side) -> MoveDesc {
    let piece = before.piece_at(from).to_ascii_lowercase();
    let last_rank = if side.is_white() { 7 } else { 0 };

    let mut mov = MoveDesc::new(from, to, side);
    mov.is_promotion = piece == 'p' && to.rank() == last_rank;
    if mov.is_promotion {
        mov.promotion = Some(PromotionPiece::Queen);
    }
    mov.is_zeroing = piece == 'p' || before.piece_at(to) != '.';
    mov
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/......../......../......../......../PPPPPPPP/RNBQKBNR";

    fn board(s: &str) -> BoardState {
        BoardState::parse(s).unwrap()
    }

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn infer_simple_move() {
        let before = board(START);
        let after = board("rnbqkbnr/pppppppp/......../......../....P.../......../PPPP.PPP/RNBQKBNR");
        assert_eq!(infer_move(&before, &after, Side::White), Some((sq("e2"), sq("e4"))));
        assert_eq!(infer_move(&before, &before, Side::White), None);
    }

    #[test]
    fn infer_capture_and_castle() {
        let before = board("rnbqkbnr/ppp.pppp/......../...p..../....P.../......../PPPP.PPP/RNBQKBNR");
        let after = board("rnbqkbnr/ppp.pppp/......../...P..../......../......../PPPP.PPP/RNBQKBNR");
        assert_eq!(infer_move(&before, &after, Side::White), Some((sq("e4"), sq("d5"))));

        let before = board("r...k..r/......../......../......../......../......../......../R...K..R");
        let after = board("..kr...r/......../......../......../......../......../......../R...K..R");
        assert_eq!(infer_move(&before, &after, Side::Black), Some((sq("e8"), sq("c8"))));
    }

    #[test]
    fn describe_uses_the_board() {
        let before = board("rnbqkbnr/ppp.pppp/......../...p..../....P.../......../PPPP.PPP/RNBQKBNR");
        let capture = describe(&before, sq("e4"), sq("d5"), Side::White);
        assert!(capture.is_zeroing && !capture.is_promotion);

        let quiet = describe(&before, sq("g1"), sq("f3"), Side::White);
        assert!(!quiet.is_zeroing);

        let before = board("......../....P.../......../......../......../......../k......./....K...");
        let promote = describe(&before, sq("e7"), sq("e8"), Side::White);
        assert!(promote.is_promotion);
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        fn script(body: &str, timeout: Duration) -> Child {
            let mut command = Command::new("sh");
            command.arg("-c").arg(body);
            Child::with_command(command, timeout).unwrap()
        }

        #[test]
        fn missing_executable_fails_to_spawn() {
            let err = Child::spawn("/nonexistent/engine", Duration::from_millis(100))
                .err()
                .unwrap();
            assert!(matches!(err, Error::Spawn { .. }));
            assert!(err.is_fatal());
        }

        #[test]
        fn withheld_reply_is_no_response() {
            let mut child = script("exec sleep 10", Duration::from_millis(100));
            let started = Instant::now();
            let err = child.initialize(Side::White).unwrap_err();
            assert!(err.is_transient(), "{:?}", err);
            assert!(started.elapsed() < Duration::from_secs(5));
            assert!(child.is_usable());

            // Silence on isMate means the game goes on.
            assert_eq!(child.terminal_status(Side::White).unwrap(), TerminalStatus::None);
        }

        #[test]
        fn closed_input_is_fatal() {
            let mut child = script("exec 0<&-; exec sleep 10", Duration::from_millis(500));
            thread::sleep(Duration::from_millis(100));

            let err = child.legal_moves(Side::White, sq("e2")).unwrap_err();
            assert!(err.is_fatal(), "{:?}", err);
            assert!(!child.is_usable());
            assert!(child.process.is_none());

            assert!(matches!(child.board(), Err(Error::Unusable)));
        }

        #[test]
        fn exited_child_is_fatal() {
            let mut child = script("exit 0", Duration::from_millis(500));
            thread::sleep(Duration::from_millis(100));

            let err = child.initialize(Side::White).unwrap_err();
            assert!(matches!(err, Error::Disconnected(_)), "{:?}", err);
            assert!(!child.is_usable());
        }

        #[test]
        fn wrong_reply_is_a_desync() {
            let mut child = script("read l; echo moveMade; exec sleep 10", Duration::from_secs(2));
            let err = child.initialize(Side::White).unwrap_err();
            assert!(matches!(err, Error::Desync { .. }), "{:?}", err);
            assert!(!child.is_usable());
        }

        #[test]
        fn error_reply_is_a_desync() {
            let mut child = script(
                "read l; echo 'error unknown command'; exec sleep 10",
                Duration::from_secs(2),
            );
            let err = child.board().unwrap_err();
            assert!(matches!(err, Error::Desync { .. }), "{:?}", err);
        }

        #[test]
        fn late_reply_is_not_taken_for_the_next_one() {
            let mut child = script(
                "read l; sleep 1; echo initSuccess; read l; echo 'moves 19 27'; exec sleep 10",
                Duration::from_millis(300),
            );
            assert!(child.initialize(Side::White).unwrap_err().is_transient());
            thread::sleep(Duration::from_millis(1200));

            let moves = child.legal_moves(Side::White, sq("d2")).unwrap();
            let targets: Vec<Square> = moves.iter().map(|m| m.to).collect();
            assert_eq!(targets, vec![sq("d3"), sq("d4")]);
        }

        const AFTER_E4: &str =
            "rnbqkbnr/pppppppp/......../......../....P.../......../PPPP.PPP/RNBQKBNR";
        const AFTER_E5: &str =
            "rnbqkbnr/pppp.ppp/......../....p.../....P.../......../PPPP.PPP/RNBQKBNR";

        #[test]
        fn late_bot_move_is_taken_instead_of_a_second_one() {
            let body = format!(
                "read l; echo '{}'; read l; sleep 1; echo 'botMoved 52 36'; \
                 read l; echo '{}'; read l; echo 'botMoved 6 21'; exec sleep 10",
                AFTER_E4, AFTER_E5
            );
            let mut child = script(&body, Duration::from_millis(300));
            let err = child
                .search_best_move(Side::Black, &Limits::default())
                .unwrap_err();
            assert!(err.is_transient(), "{:?}", err);
            thread::sleep(Duration::from_millis(1200));

            let (mov, _) = child
                .search_best_move(Side::Black, &Limits::default())
                .unwrap();
            assert_eq!((mov.from, mov.to, mov.side), (sq("e7"), sq("e5"), Side::Black));
            assert!(mov.is_zeroing);
            assert_eq!(child.commit(&mov).unwrap(), "e7e5");
            assert!(child.is_usable());
        }

        #[test]
        fn unchanged_board_after_a_lost_bot_move_asks_again() {
            let body = format!(
                "read l; echo '{}'; read l; \
                 read l; echo '{}'; read l; echo '{}'; read l; echo 'botMoved 52 36'; \
                 exec sleep 10",
                AFTER_E4, AFTER_E4, AFTER_E4
            );
            let mut child = script(&body, Duration::from_millis(300));
            assert!(child
                .search_best_move(Side::Black, &Limits::default())
                .unwrap_err()
                .is_transient());

            let (mov, _) = child
                .search_best_move(Side::Black, &Limits::default())
                .unwrap();
            assert_eq!((mov.from, mov.to), (sq("e7"), sq("e5")));
        }

        #[test]
        fn bot_move_for_the_wrong_side_is_a_desync() {
            let body = format!(
                "read l; echo '{}'; read l; echo 'botMoved 6 21'; exec sleep 10",
                AFTER_E4
            );
            let mut child = script(&body, Duration::from_secs(2));
            let err = child
                .search_best_move(Side::Black, &Limits::default())
                .unwrap_err();
            assert!(matches!(err, Error::Desync { .. }), "{:?}", err);
            assert!(!child.is_usable());
        }

        #[test]
        fn late_move_made_is_acknowledged_on_retry() {
            let body = format!(
                "read l; sleep 1; echo moveMade; read l; echo '{}'; exec sleep 10",
                AFTER_E4
            );
            let mut child = script(&body, Duration::from_millis(300));
            let mov = MoveDesc::new(sq("e2"), sq("e4"), Side::White);
            assert!(child.commit(&mov).unwrap_err().is_transient());
            thread::sleep(Duration::from_millis(1200));

            // Only the board is fetched; `move` is not sent a second time.
            assert_eq!(child.commit(&mov).unwrap(), "e2e4");
            assert!(child.is_usable());
        }

        #[test]
        fn lost_move_is_sent_again() {
            let body = format!(
                "read l; read l; echo '{}'; read l; echo moveMade; exec sleep 10",
                START
            );
            let mut child = script(&body, Duration::from_millis(300));
            let mov = MoveDesc::new(sq("e2"), sq("e4"), Side::White);
            assert!(child.commit(&mov).unwrap_err().is_transient());
            assert_eq!(child.commit(&mov).unwrap(), "e2e4");
        }

        #[test]
        fn applied_move_blocks_a_different_one() {
            let body = format!(
                "read l; sleep 1; echo moveMade; read l; echo '{}'; exec sleep 10",
                AFTER_E4
            );
            let mut child = script(&body, Duration::from_millis(300));
            let e4 = MoveDesc::new(sq("e2"), sq("e4"), Side::White);
            assert!(child.commit(&e4).unwrap_err().is_transient());
            thread::sleep(Duration::from_millis(1200));

            let d4 = MoveDesc::new(sq("d2"), sq("d4"), Side::White);
            let err = child.commit(&d4).unwrap_err();
            assert!(matches!(err, Error::Desync { .. }), "{:?}", err);
            assert!(!child.is_usable());
        }

        #[test]
        fn silent_bot_move_is_inferred_and_acknowledged_locally() {
            let body = "\
                read l; echo 'rnbqkbnr/pppppppp/......../......../....P.../......../PPPP.PPP/RNBQKBNR'; \
                read l; echo botMoved; \
                read l; echo 'rnbqkbnr/pppp.ppp/......../....p.../....P.../......../PPPP.PPP/RNBQKBNR'; \
                exec sleep 10";
            let mut child = script(body, Duration::from_secs(2));
            let (mov, debug_text) = child
                .search_best_move(Side::Black, &Limits::default())
                .unwrap();
            assert_eq!((mov.from, mov.to), (sq("e7"), sq("e5")));
            assert!(mov.is_zeroing);
            assert!(debug_text.is_empty());

            // No `move` command is sent for the engine's own move.
            assert_eq!(child.commit(&mov).unwrap(), "e7e5");
            assert!(child.is_usable());
        }
    }
}
