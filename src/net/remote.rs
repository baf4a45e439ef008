//! src/net/remote.rs
//!
//! Tiny line-based TCP control server for loading and running programs.
//!
//! One command per line, one reply line per command (`OK ...` or `ERR ...`):
//!
//! - `program <json>`: load a program tree into the workspace
//! - `level <json>`: load a level descriptor
//! - `run`: start an animated run of the workspace program
//! - `eval <json>`: run a program headless on the current level, reply with
//!   the `{success, score?, error?}` report
//! - `result`: report of the last finished run
//! - `status`: level, robot position and facing, running flag, total score
//! - `reset`, `clear`
//! - `quit`
//!
//! Lines longer than [`MAX_LINE_LEN`] bytes are discarded with
//! `ERR line too long`.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;
use std::time::Instant;

use crate::game::shared::{self, GameError, SharedGame};
use crate::program::Program;
use crate::world::Level;

/// Longest accepted command line, newline included.
pub const MAX_LINE_LEN: u64 = 64 * 1024;

enum Incoming {
    Line(String),
    TooLong,
    Closed,
}

/// Read one newline-terminated line of at most `MAX_LINE_LEN` bytes. An
/// over-long line is consumed up to its newline and reported as `TooLong`.
fn next_line<R: BufRead>(rdr: &mut R) -> io::Result<Incoming> {
    let mut buf = Vec::new();
    let n = rdr.by_ref().take(MAX_LINE_LEN).read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(Incoming::Closed);
    }
    if n as u64 == MAX_LINE_LEN && buf.last() != Some(&b'\n') {
        rdr.skip_until(b'\n')?;
        return Ok(Incoming::TooLong);
    }
    Ok(Incoming::Line(String::from_utf8_lossy(&buf).into_owned()))
}

/// Bind `addr` and serve clients until the listener fails.
pub fn remote_server(addr: &str, game: SharedGame) {
    let listener = match TcpListener::bind(addr) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "remote_server: bind failed");
            return;
        }
    };
    tracing::info!(%addr, "remote control listening");
    serve(listener, game);
}

/// Accept loop; one handler thread per client.
pub fn serve(listener: TcpListener, game: SharedGame) {
    for stream in listener.incoming() {
        match stream {
            Ok(s) => {
                let g = game.clone();
                thread::spawn(move || handle_remote_client(s, g));
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote_server: accept error");
            }
        }
    }
}

pub fn handle_remote_client(mut s: TcpStream, game: SharedGame) {
    let peer = s
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<peer?>".into());
    tracing::info!(%peer, "remote client connected");

    let reader = match s.try_clone() {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(%peer, error = %e, "cannot clone client stream");
            return;
        }
    };
    let mut rdr = BufReader::new(reader);

    loop {
        let line = match next_line(&mut rdr) {
            Ok(Incoming::Line(line)) => line,
            Ok(Incoming::TooLong) => {
                tracing::warn!(%peer, limit = MAX_LINE_LEN, "remote line too long");
                if s.write_all(b"ERR line too long\n").is_err() {
                    break;
                }
                continue;
            }
            Ok(Incoming::Closed) | Err(_) => break,
        };
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        let (reply, close) = handle_command(raw, &game);
        if reply.starts_with("ERR") {
            tracing::warn!(%peer, command = raw, %reply, "remote command rejected");
        } else {
            tracing::debug!(%peer, command = raw, "remote command");
        }
        if s.write_all(format!("{reply}\n").as_bytes()).is_err() || close {
            break;
        }
    }

    tracing::info!(%peer, "remote client disconnected");
    let _ = s.shutdown(Shutdown::Both);
}

fn busy_or(err: GameError) -> String {
    match err {
        GameError::Busy => "ERR busy".into(),
        other => format!("ERR {other}"),
    }
}

/// Execute one command line. Returns the reply and whether to hang up.
pub fn handle_command(raw: &str, game: &SharedGame) -> (String, bool) {
    let (verb, payload) = match raw.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (raw, ""),
    };

    let reply = match (verb.to_lowercase().as_str(), payload.is_empty()) {
        ("program", false) => match Program::from_json(payload) {
            Ok(program) => match shared::write(game).load_program(program) {
                Ok(()) => "OK".into(),
                Err(e) => busy_or(e),
            },
            Err(e) => format!("ERR json {e}"),
        },

        ("level", false) => match Level::from_json(payload) {
            Ok(level) => match shared::write(game).load_level(level, "Remote level") {
                Ok(()) => "OK".into(),
                Err(e) => busy_or(e),
            },
            Err(e) => format!("ERR {e}"),
        },

        ("eval", false) => match Program::from_json(payload) {
            Ok(program) => format!("OK {}", shared::read(game).evaluate(&program).to_json()),
            Err(e) => format!("ERR json {e}"),
        },

        ("run", true) => match shared::write(game).start_run(Instant::now()) {
            Ok(()) => "OK started".into(),
            Err(e) => busy_or(e),
        },

        ("result", true) => match shared::read(game).history.latest() {
            Some(record) => format!("OK {}", record.report.to_json()),
            None => "ERR no_result".into(),
        },

        ("status", true) => {
            let g = shared::read(game);
            let size = g.level().size;
            format!(
                "OK level=\"{}\" size={}x{} player={},{} facing={} running={} score={}",
                g.level_label,
                size.width,
                size.height,
                g.world.player.x,
                g.world.player.y,
                g.world.facing.name(),
                g.is_running(),
                g.total_score
            )
        }

        ("reset", true) => match shared::write(game).reset() {
            Ok(()) => "OK".into(),
            Err(e) => busy_or(e),
        },

        ("clear", true) => match shared::write(game).edit(|ws| {
            ws.clear();
            Ok(())
        }) {
            Ok(()) => "OK".into(),
            Err(e) => busy_or(e),
        },

        ("quit", true) => return ("OK bye".into(), true),

        _ => format!("ERR unknown {raw}"),
    };
    (reply, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameShared};
    use crate::world::level::builtin_level;

    fn game() -> SharedGame {
        shared::shared(GameShared::new(
            GameConfig::default(),
            builtin_level(1).unwrap(),
            "Level 1",
        ))
    }

    #[test]
    fn test_eval_replies_with_report() {
        let g = game();
        let (reply, close) = handle_command(
            r#"eval [{"type":"repeat","count":4,"children":[{"type":"move-forward"}]}]"#,
            &g,
        );
        assert_eq!(reply, r#"OK {"success":true,"score":80}"#);
        assert!(!close);

        let (reply, _) = handle_command(r#"eval []"#, &g);
        assert_eq!(reply, r#"OK {"success":false,"error":"the program is empty"}"#);
    }

    #[test]
    fn test_program_then_run_and_busy() {
        let g = game();
        let (reply, _) = handle_command(r#"program [{"type":"move-forward"}]"#, &g);
        assert_eq!(reply, "OK");
        assert_eq!(shared::read(&g).workspace.block_count(), 1);

        assert_eq!(handle_command("run", &g).0, "OK started");
        assert_eq!(handle_command("run", &g).0, "ERR busy");
        assert_eq!(handle_command("reset", &g).0, "ERR busy");
        assert_eq!(handle_command("clear", &g).0, "ERR busy");
        assert_eq!(handle_command("result", &g).0, "ERR no_result");
    }

    #[test]
    fn test_run_empty_workspace_reports_error() {
        let g = game();
        assert_eq!(handle_command("run", &g).0, "ERR the program is empty");
        assert_eq!(
            handle_command("result", &g).0,
            r#"OK {"success":false,"error":"the program is empty"}"#
        );
    }

    #[test]
    fn test_level_and_status() {
        let g = game();
        let (reply, _) = handle_command(
            r#"level {"size":{"width":3,"height":2},"player":{"x":1,"y":1,"direction":"west"},"goal":{"x":0,"y":0}}"#,
            &g,
        );
        assert_eq!(reply, "OK");
        assert_eq!(
            handle_command("status", &g).0,
            r#"OK level="Remote level" size=3x2 player=1,1 facing=west running=false score=0"#
        );

        let (reply, _) = handle_command(
            r#"level {"size":{"width":0,"height":2},"player":{"x":0,"y":0,"direction":"west"},"goal":{"x":0,"y":0}}"#,
            &g,
        );
        assert!(reply.starts_with("ERR grid must be"), "{reply}");
    }

    #[test]
    fn test_oversized_level_is_refused() {
        let g = game();
        let (reply, _) = handle_command(
            r#"level {"size":{"width":4294967295,"height":1},"player":{"x":2147483647,"y":0,"direction":"east"},"goal":{"x":0,"y":0}}"#,
            &g,
        );
        assert!(reply.starts_with("ERR grid is at most 64x64"), "{reply}");
        assert_eq!(shared::read(&g).level_label, "Level 1");
    }

    #[test]
    fn test_long_line_is_skipped() {
        let mut input = vec![b'a'; MAX_LINE_LEN as usize + 10];
        input.extend_from_slice(b"\nstatus\n");
        let mut rdr = io::Cursor::new(input);

        assert!(matches!(next_line(&mut rdr).unwrap(), Incoming::TooLong));
        match next_line(&mut rdr).unwrap() {
            Incoming::Line(line) => assert_eq!(line, "status\n"),
            _ => panic!("expected the next command"),
        }
        assert!(matches!(next_line(&mut rdr).unwrap(), Incoming::Closed));
    }

    #[test]
    fn test_bad_input() {
        let g = game();
        assert!(handle_command("program {nope", &g).0.starts_with("ERR json"));
        assert_eq!(handle_command("dance", &g).0, "ERR unknown dance");
        assert_eq!(handle_command("program", &g).0, "ERR unknown program");
        assert_eq!(handle_command("quit", &g), ("OK bye".to_string(), true));
    }

    #[test]
    fn test_tcp_session() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let g = game();
        thread::spawn(move || serve(listener, g));

        let mut stream = TcpStream::connect(addr).unwrap();
        let mut rdr = BufReader::new(stream.try_clone().unwrap());
        let mut reply = String::new();

        stream
            .write_all(b"eval [{\"type\":\"turn-left\"}]\nquit\n")
            .unwrap();
        rdr.read_line(&mut reply).unwrap();
        assert_eq!(
            reply.trim(),
            r#"OK {"success":false,"error":"the robot did not reach the goal"}"#
        );
        reply.clear();
        rdr.read_line(&mut reply).unwrap();
        assert_eq!(reply.trim(), "OK bye");
    }
}
