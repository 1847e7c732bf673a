use anyhow::{bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// WAL operation types.
///
/// One line per queue mutation; replayed on startup to rebuild the in-memory
/// boards. Free-text fields (title, password, username, status) are hex
/// encoded so the pipe delimiter stays unambiguous. Class ids are `\w` only
/// and stored raw.
#[derive(Debug, Clone, PartialEq)]
pub enum WalOperation {
    CreateBoard {
        class_id: String,
        title: String,
        password: String,
        question_based: bool,
    },
    RemoveBoard {
        class_id: String,
    },
    AddParticipant {
        class_id: String,
        id: u64,
        role: ParticipantRole,
        username: String,
        token: String,
        last_heartbeat: i64,
    },
    RemoveParticipant {
        class_id: String,
        id: u64,
    },
    Enter {
        class_id: String,
        student_id: u64,
        at: i64,
    },
    Exit {
        class_id: String,
        student_id: u64,
    },
    Accept {
        class_id: String,
        ta_id: u64,
        student_id: u64,
    },
    Release {
        class_id: String,
        ta_id: u64,
    },
    SetFlags {
        class_id: String,
        active: bool,
        frozen: bool,
        status: String,
    },
    Heartbeat {
        class_id: String,
        id: u64,
        at: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    Student,
    Ta,
}

impl ParticipantRole {
    fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Student => "STUDENT",
            ParticipantRole::Ta => "TA",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s {
            "STUDENT" => Ok(ParticipantRole::Student),
            "TA" => Ok(ParticipantRole::Ta),
            other => bail!("Unknown participant role: {}", other),
        }
    }
}

fn decode_text(part: &str) -> Result<String> {
    let bytes = hex::decode(part).context("Invalid hex text field")?;
    String::from_utf8(bytes).context("Text field is not valid UTF-8")
}

impl WalOperation {
    fn to_line(&self) -> String {
        match self {
            WalOperation::CreateBoard {
                class_id,
                title,
                password,
                question_based,
            } => format!(
                "CREATE_BOARD|{}|{}|{}|{}",
                class_id,
                hex::encode(title),
                hex::encode(password),
                if *question_based { "1" } else { "0" }
            ),
            WalOperation::RemoveBoard { class_id } => format!("REMOVE_BOARD|{}", class_id),
            WalOperation::AddParticipant {
                class_id,
                id,
                role,
                username,
                token,
                last_heartbeat,
            } => format!(
                "ADD_PARTICIPANT|{}|{}|{}|{}|{}|{}",
                class_id,
                id,
                role.as_str(),
                hex::encode(username),
                token,
                last_heartbeat
            ),
            WalOperation::RemoveParticipant { class_id, id } => {
                format!("REMOVE_PARTICIPANT|{}|{}", class_id, id)
            }
            WalOperation::Enter {
                class_id,
                student_id,
                at,
            } => format!("ENTER|{}|{}|{}", class_id, student_id, at),
            WalOperation::Exit {
                class_id,
                student_id,
            } => format!("EXIT|{}|{}", class_id, student_id),
            WalOperation::Accept {
                class_id,
                ta_id,
                student_id,
            } => format!("ACCEPT|{}|{}|{}", class_id, ta_id, student_id),
            WalOperation::Release { class_id, ta_id } => {
                format!("RELEASE|{}|{}", class_id, ta_id)
            }
            WalOperation::SetFlags {
                class_id,
                active,
                frozen,
                status,
            } => format!(
                "SET_FLAGS|{}|{}|{}|{}",
                class_id,
                if *active { "1" } else { "0" },
                if *frozen { "1" } else { "0" },
                hex::encode(status)
            ),
            WalOperation::Heartbeat { class_id, id, at } => {
                format!("HEARTBEAT|{}|{}|{}", class_id, id, at)
            }
        }
    }

    fn from_line(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split('|').collect();

        match parts.first() {
            Some(&"CREATE_BOARD") => {
                if parts.len() != 5 {
                    bail!("Invalid CREATE_BOARD format");
                }
                Ok(WalOperation::CreateBoard {
                    class_id: parts[1].to_string(),
                    title: decode_text(parts[2])?,
                    password: decode_text(parts[3])?,
                    question_based: parts[4] == "1",
                })
            }
            Some(&"REMOVE_BOARD") => {
                if parts.len() != 2 {
                    bail!("Invalid REMOVE_BOARD format");
                }
                Ok(WalOperation::RemoveBoard {
                    class_id: parts[1].to_string(),
                })
            }
            Some(&"ADD_PARTICIPANT") => {
                if parts.len() != 7 {
                    bail!("Invalid ADD_PARTICIPANT format");
                }
                Ok(WalOperation::AddParticipant {
                    class_id: parts[1].to_string(),
                    id: parts[2].parse::<u64>().context("Invalid participant id")?,
                    role: ParticipantRole::parse(parts[3])?,
                    username: decode_text(parts[4])?,
                    token: parts[5].to_string(),
                    last_heartbeat: parts[6].parse::<i64>().context("Invalid heartbeat")?,
                })
            }
            Some(&"REMOVE_PARTICIPANT") => {
                if parts.len() != 3 {
                    bail!("Invalid REMOVE_PARTICIPANT format");
                }
                Ok(WalOperation::RemoveParticipant {
                    class_id: parts[1].to_string(),
                    id: parts[2].parse::<u64>().context("Invalid participant id")?,
                })
            }
            Some(&"ENTER") => {
                if parts.len() != 4 {
                    bail!("Invalid ENTER format");
                }
                Ok(WalOperation::Enter {
                    class_id: parts[1].to_string(),
                    student_id: parts[2].parse::<u64>().context("Invalid student id")?,
                    at: parts[3].parse::<i64>().context("Invalid timestamp")?,
                })
            }
            Some(&"EXIT") => {
                if parts.len() != 3 {
                    bail!("Invalid EXIT format");
                }
                Ok(WalOperation::Exit {
                    class_id: parts[1].to_string(),
                    student_id: parts[2].parse::<u64>().context("Invalid student id")?,
                })
            }
            Some(&"ACCEPT") => {
                if parts.len() != 4 {
                    bail!("Invalid ACCEPT format");
                }
                Ok(WalOperation::Accept {
                    class_id: parts[1].to_string(),
                    ta_id: parts[2].parse::<u64>().context("Invalid TA id")?,
                    student_id: parts[3].parse::<u64>().context("Invalid student id")?,
                })
            }
            Some(&"RELEASE") => {
                if parts.len() != 3 {
                    bail!("Invalid RELEASE format");
                }
                Ok(WalOperation::Release {
                    class_id: parts[1].to_string(),
                    ta_id: parts[2].parse::<u64>().context("Invalid TA id")?,
                })
            }
            Some(&"SET_FLAGS") => {
                if parts.len() != 5 {
                    bail!("Invalid SET_FLAGS format");
                }
                Ok(WalOperation::SetFlags {
                    class_id: parts[1].to_string(),
                    active: parts[2] == "1",
                    frozen: parts[3] == "1",
                    status: decode_text(parts[4])?,
                })
            }
            Some(&"HEARTBEAT") => {
                if parts.len() != 4 {
                    bail!("Invalid HEARTBEAT format");
                }
                Ok(WalOperation::Heartbeat {
                    class_id: parts[1].to_string(),
                    id: parts[2].parse::<u64>().context("Invalid participant id")?,
                    at: parts[3].parse::<i64>().context("Invalid timestamp")?,
                })
            }
            _ => bail!("Unknown operation type"),
        }
    }
}

pub struct Wal {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl Wal {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open WAL file")?;

        Ok(Wal {
            file: Arc::new(Mutex::new(file)),
            path,
        })
    }

    pub fn log_operation(&self, op: WalOperation) -> Result<()> {
        let line = op.to_line();
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", line).context("Failed to write to WAL")?;
        file.flush().context("Failed to flush WAL")?;
        Ok(())
    }

    pub fn replay(&self) -> Result<Vec<WalOperation>> {
        let file = File::open(&self.path).context("Failed to open WAL for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from WAL")?;
            let line = line.trim();

            // Skip empty lines
            if line.is_empty() {
                continue;
            }

            match WalOperation::from_line(line) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    tracing::warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Failed to parse WAL line, skipping"
                    );
                }
            }
        }

        Ok(operations)
    }

    pub fn truncate(&self) -> Result<()> {
        let mut file = self.file.lock().unwrap();
        file.set_len(0).context("Failed to truncate WAL")?;
        file.flush().context("Failed to flush WAL after truncate")?;
        Ok(())
    }
}
