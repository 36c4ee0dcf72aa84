//! Abstract machine command stream.
//!
//! The pipeline's final artifact: an ordered sequence of tagged moves plus
//! metadata comments, consumed by an external dialect-specific emitter
//! (G-code, HPGL, ...). Arc commands always carry center-relative offsets
//! since at least one target dialect requires them.

use vectorcam_core::Point;

/// A single abstract machine command.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineCommand {
    /// Human-readable metadata, emitted as a comment by the dialect
    /// formatter.
    Comment(String),
    /// Traversal move above the stock, full speed.
    RapidMove { x: f64, y: f64, z: f64 },
    /// Cutting move at feed rate.
    LinearMove { x: f64, y: f64, z: f64 },
    /// Clockwise arc; `i`/`j` are the center offsets relative to the
    /// current position.
    ArcCw { x: f64, y: f64, z: f64, i: f64, j: f64 },
    /// Counter-clockwise arc with center-relative offsets.
    ArcCcw { x: f64, y: f64, z: f64, i: f64, j: f64 },
}

/// Records machine commands and tracks the resulting tool position.
///
/// Built once per pipeline run and handed to the emitter; not persisted.
#[derive(Debug, Clone, Default)]
pub struct CommandStream {
    commands: Vec<MachineCommand>,
    position: Point,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tool position after all recorded moves.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn commands(&self) -> &[MachineCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<MachineCommand> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.commands.push(MachineCommand::Comment(text.into()));
    }

    pub fn rapid_move(&mut self, x: f64, y: f64, z: f64) {
        self.commands.push(MachineCommand::RapidMove { x, y, z });
        self.position = Point::new_3d(x, y, z);
    }

    pub fn linear_move(&mut self, x: f64, y: f64, z: f64) {
        self.commands.push(MachineCommand::LinearMove { x, y, z });
        self.position = Point::new_3d(x, y, z);
    }

    pub fn arc_cw(&mut self, x: f64, y: f64, z: f64, i: f64, j: f64) {
        self.commands.push(MachineCommand::ArcCw { x, y, z, i, j });
        self.position = Point::new_3d(x, y, z);
    }

    pub fn arc_ccw(&mut self, x: f64, y: f64, z: f64, i: f64, j: f64) {
        self.commands.push(MachineCommand::ArcCcw { x, y, z, i, j });
        self.position = Point::new_3d(x, y, z);
    }
}
