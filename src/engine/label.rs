// ==========================================
// LAGA Lagerverwaltung - Etiketten
// ==========================================
// Zuständigkeit: ZPL-Text für die Barcode-Etiketten erzeugen und an
// den gewählten Drucker übergeben. Der Code128-Strich entsteht im
// Drucker selbst (^BC); Treiber und Spoolmechanik bleiben außerhalb.
// ==========================================

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// LabelFormat - Etikettengeometrie je Druckerfamilie
// ==========================================
// Maße bei 203 dpi: 40x20mm ~ 320x160 Punkte, 57x24mm ~ 456x192 Punkte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    Compact40x20,
    Wide57x24,
}

impl LabelFormat {
    /// Geometrie aus dem Druckernamen ableiten.
    ///
    /// Die kleinen LP28er-Geräte nehmen die 40x20-Rolle, alles andere
    /// (insbesondere die GK420-Familie) die 57x24-Rolle.
    pub fn for_printer(printer_name: &str) -> Self {
        if printer_name.to_uppercase().contains("LP28") {
            LabelFormat::Compact40x20
        } else {
            LabelFormat::Wide57x24
        }
    }

    fn width_dots(&self) -> u32 {
        match self {
            LabelFormat::Compact40x20 => 320,
            LabelFormat::Wide57x24 => 456,
        }
    }

    fn length_dots(&self) -> u32 {
        match self {
            LabelFormat::Compact40x20 => 160,
            LabelFormat::Wide57x24 => 192,
        }
    }

    fn bar_height(&self) -> u32 {
        match self {
            LabelFormat::Compact40x20 => 60,
            LabelFormat::Wide57x24 => 80,
        }
    }

    /// Zeichenbudget für den Artikelnamen auf dem Etikett
    fn name_budget(&self) -> usize {
        match self {
            LabelFormat::Compact40x20 => 20,
            LabelFormat::Wide57x24 => 28,
        }
    }
}

/// Artikelname auf das Zeichenbudget des Etiketts kürzen
fn truncate_name(name: &str, budget: usize) -> String {
    if name.chars().count() <= budget {
        name.to_string()
    } else {
        let mut shortened: String = name.chars().take(budget).collect();
        shortened.push_str("...");
        shortened
    }
}

/// ZPL für ein Etikett: gekürzter Artikelname, Code128-Strichcode
/// (^BC) und der Barcode nochmals als Klartextzeile.
pub fn compose_zpl(format: LabelFormat, article_name: &str, barcode: &str) -> String {
    let name = truncate_name(article_name, format.name_budget());
    format!(
        "^XA\n^PW{width}\n^LL{length}\n^CF0,24\n^FO16,12^FD{name}^FS\n^FO16,44^BY2^BCN,{bar},N,N,N^FD{barcode}^FS\n^FO16,{text_y}^FD{barcode}^FS\n^XZ\n",
        width = format.width_dots(),
        length = format.length_dots(),
        name = name,
        bar = format.bar_height(),
        barcode = barcode,
        text_y = format.length_dots() - 28,
    )
}

// ==========================================
// LabelPrinter - Übergabestelle an die Druckerseite
// ==========================================
// Der Engine ist egal, wie das ZPL zum Gerät kommt; Tests hängen
// hier eine Attrappe ein.
#[async_trait]
pub trait LabelPrinter: Send + Sync {
    /// Einen fertigen ZPL-Block zum Druck übergeben
    async fn print(&self, zpl: &str) -> EngineResult<()>;
}

// ==========================================
// SpoolDirPrinter - Übergabe per Spool-Verzeichnis
// ==========================================
// Schreibt jeden Etikettenblock als .zpl-Datei in ein Verzeichnis,
// das der Druckdienst des Systems abholt.
pub struct SpoolDirPrinter {
    spool_dir: PathBuf,
    printer_name: String,
}

impl SpoolDirPrinter {
    pub fn new(spool_dir: impl AsRef<Path>, printer_name: impl Into<String>) -> Self {
        Self {
            spool_dir: spool_dir.as_ref().to_path_buf(),
            printer_name: printer_name.into(),
        }
    }

    pub fn printer_name(&self) -> &str {
        &self.printer_name
    }
}

#[async_trait]
impl LabelPrinter for SpoolDirPrinter {
    async fn print(&self, zpl: &str) -> EngineResult<()> {
        tokio::fs::create_dir_all(&self.spool_dir)
            .await
            .map_err(|e| EngineError::Label(e.to_string()))?;

        let file_name = format!("etikett-{}.zpl", uuid::Uuid::new_v4());
        let target = self.spool_dir.join(file_name);
        tokio::fs::write(&target, zpl)
            .await
            .map_err(|e| EngineError::Label(e.to_string()))?;

        info!(drucker = %self.printer_name, datei = %target.display(), "Etikett gespoolt");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_by_printer_family() {
        assert_eq!(LabelFormat::for_printer("Zebra LP2824 Plus"), LabelFormat::Compact40x20);
        assert_eq!(LabelFormat::for_printer("Zebra GK420d"), LabelFormat::Wide57x24);
        assert_eq!(LabelFormat::for_printer("Unbekannt"), LabelFormat::Wide57x24);
    }

    #[test]
    fn test_compose_zpl_contains_code128_and_text_line() {
        let zpl = compose_zpl(LabelFormat::Wide57x24, "Schraube M6", "1234567890");

        assert!(zpl.starts_with("^XA"));
        assert!(zpl.trim_end().ends_with("^XZ"));
        assert!(zpl.contains("^BCN,80,N,N,N^FD1234567890^FS"));
        // Barcode zusätzlich als Klartext
        assert_eq!(zpl.matches("1234567890").count(), 2);
        assert!(zpl.contains("Schraube M6"));
    }

    #[test]
    fn test_compose_zpl_truncates_long_names() {
        let long_name = "Sechskantschraube mit Flansch M6x40 verzinkt";
        let zpl = compose_zpl(LabelFormat::Compact40x20, long_name, "1234567890");

        assert!(!zpl.contains(long_name));
        assert!(zpl.contains("..."));
    }

    #[tokio::test]
    async fn test_spool_printer_writes_zpl_file() {
        let dir = tempfile::tempdir().unwrap();
        let printer = SpoolDirPrinter::new(dir.path(), "Zebra GK420d");

        printer.print("^XA^FDTest^FS^XZ").await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let content = std::fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
        assert!(content.contains("^FDTest^FS"));
    }
}
