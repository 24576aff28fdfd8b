use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use liftlog::Tracker;
use liftlog::auth::AuthSession;
use liftlog::photos::decode_photo;
use liftlog::tracker::GalleryItem;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::Screen;
use super::form::{Field, Form, FormEvent};

const DATE: usize = 0;
const CAPTION: usize = 1;
const FILE: usize = 2;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub struct PhotosScreen {
    today: NaiveDate,
    form: Form,
    gallery: Vec<GalleryItem>,
    selected: usize,
}

/// Reads an upload, refusing anything but JPEG and PNG files.
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        bail!("Choose a .jpg, .jpeg or .png image");
    }
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

impl PhotosScreen {
    pub fn new(today: NaiveDate) -> Self {
        let form = Form::new(vec![
            Field::date("Photo date", today),
            Field::text("Caption (e.g., Week 4, 21.1% → 18%)", ""),
            Field::text("Image file", ""),
        ]);
        Self {
            today,
            form,
            gallery: Vec::new(),
            selected: 0,
        }
    }

    fn save_selected(&self, tracker: &Tracker, auth: &AuthSession) -> Result<Option<String>> {
        let Some(item) = self.gallery.get(self.selected) else {
            return Ok(None);
        };
        let Some(photo) = tracker.photo(auth, item.id)? else {
            bail!("Photo {} no longer exists", item.id);
        };
        let path = format!("photo-{}.jpg", photo.id);
        fs::write(&path, decode_photo(&photo.image_b64)?)
            .with_context(|| format!("writing {}", path))?;
        Ok(Some(format!("Saved {} to {}", photo, path)))
    }
}

impl Screen for PhotosScreen {
    fn title(&self) -> &'static str {
        "Photos"
    }

    fn reload(&mut self, tracker: &Tracker, auth: &AuthSession) -> Result<()> {
        let now = super::today();
        self.form.roll_date(DATE, self.today, now);
        self.today = now;
        self.gallery = tracker.gallery(auth)?;
        if self.selected >= self.gallery.len() {
            self.selected = self.gallery.len().saturating_sub(1);
        }
        Ok(())
    }

    fn hints(&self) -> &'static str {
        "e: upload | j/k: select | s: save photo to file"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, editing: bool) {
        let chunks = Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).split(area);
        self.form.render(frame, chunks[0], "Upload progress photo", editing);

        if self.gallery.is_empty() {
            let empty_msg = Paragraph::new("No photos yet.")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL).title("Gallery"));
            frame.render_widget(empty_msg, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .gallery
            .iter()
            .enumerate()
            .map(|(idx, photo)| {
                let content = format!(
                    "{} - {}  ({}x{}, {} KB)",
                    photo.photo_date,
                    photo.caption,
                    photo.width,
                    photo.height,
                    photo.bytes.div_ceil(1024)
                );
                let style = if idx == self.selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(content).style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Gallery ({} total)", self.gallery.len())),
        );
        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    fn handle_edit(
        &mut self,
        key: KeyEvent,
        tracker: &Tracker,
        auth: &AuthSession,
    ) -> Result<Option<String>> {
        match self.form.handle_key(key) {
            FormEvent::Submit => {
                let file = self.form.text(FILE);
                if file.is_empty() {
                    bail!("Choose an image file first");
                }
                let bytes = read_image(Path::new(file))?;
                let photo_date = self.form.date(DATE)?;
                tracker.upload_photo(auth, photo_date, self.form.text(CAPTION), &bytes)?;
                self.form.set_value(CAPTION, "");
                self.form.set_value(FILE, "");
                Ok(Some("Uploaded.".to_string()))
            }
            _ => Ok(None),
        }
    }

    fn handle_browse(
        &mut self,
        key: KeyEvent,
        tracker: &Tracker,
        auth: &AuthSession,
    ) -> Result<Option<String>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.gallery.len() {
                    self.selected += 1;
                }
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Ok(None)
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.save_selected(tracker, auth),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_image_files_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        fs::write(&notes, b"not an image").unwrap();
        assert_eq!(
            read_image(&notes).unwrap_err().to_string(),
            "Choose a .jpg, .jpeg or .png image"
        );

        let upper = dir.path().join("front.JPG");
        fs::write(&upper, b"bytes").unwrap();
        assert_eq!(read_image(&upper).unwrap(), b"bytes");

        assert!(read_image(&dir.path().join("missing.png")).is_err());
    }
}
