// ==========================================
// LAGA Lagerverwaltung - Bewegungsprotokoll
// ==========================================
// Anfügende UTF-8-Textdatei, eine Zeile je Mutation.
// Jeder Schreibzugriff läuft unter einer Mutex, damit sich
// überlappende Protokollaufrufe nicht in die Zeile schreiben.
// ==========================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::domain::movement::MovementEntry;
use crate::engine::error::{EngineError, EngineResult};

pub struct MovementLogger {
    path: PathBuf,
    // Schutz gegen verschachtelte Zeilen bei überlappenden Aufrufen
    write_lock: Mutex<()>,
}

impl MovementLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Eintrag anfügen.
    ///
    /// Legt Datei und Elternverzeichnis bei Bedarf an. Die Datei wird
    /// je Aufruf kurz geöffnet und wieder geschlossen.
    pub fn append(&self, entry: &MovementEntry) -> EngineResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| EngineError::MovementLog(format!("Sperre nicht erhalten: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::MovementLog(e.to_string()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EngineError::MovementLog(e.to_string()))?;

        let line = entry.format_line();
        writeln!(file, "{}", line).map_err(|e| EngineError::MovementLog(e.to_string()))?;

        debug!(artikel = %entry.article_name, aktion = entry.kind.label(), "Bewegung protokolliert");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
