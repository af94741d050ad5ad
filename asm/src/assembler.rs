use indexmap::IndexMap;

use rvarch::imm::{self, Imm};
use rvarch::inst::Inst;

use crate::error::Error;
use crate::expand;
use crate::labels::Labels;
use crate::tokenizer;

/// Default load address of the data segment.
pub const DATA_START: u32 = 0x1000_0000;

/// Two-pass assembler for one source document.
///
/// Pass 1 walks the lines, collecting labels and an ordered row ->
/// instruction map (pseudo-ops expand to 1 or 2 rows). Pass 2 walks the
/// rows in order, resolves label immediates and emits 4 little-endian
/// bytes per row. Errors accumulate and never abort a pass; the caller
/// checks `has_error` and discards the output when it is set.
#[derive(Debug)]
pub struct Assembler {
    data_start: u32,
    cursor: u32,
    in_data: bool,
    rows: IndexMap<u32, Inst<Imm>>,
    label_uses: IndexMap<u32, String>,
    labels: Labels,
    text: Vec<u8>,
    data: Vec<u8>,
    errors: Vec<Error>,
}

impl Default for Assembler {
    fn default() -> Self {
        Assembler::new(DATA_START)
    }
}

impl Assembler {
    /// `data_start` is the byte address at which the data segment will
    /// be loaded; data labels are pre-offset by it.
    pub fn new(data_start: u32) -> Self {
        Assembler {
            data_start,
            cursor: 0,
            in_data: false,
            rows: IndexMap::new(),
            label_uses: IndexMap::new(),
            labels: Labels::new(),
            text: Vec::new(),
            data: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Clear all state for a fresh invocation.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.in_data = false;
        self.rows.clear();
        self.label_uses.clear();
        self.labels = Labels::new();
        self.text.clear();
        self.data.clear();
        self.errors.clear();
    }

    /// Assemble a whole document.
    pub fn assemble(&mut self, source: &str) {
        self.restart();
        for line in source.lines() {
            self.line(line);
        }
        self.emit();
    }

    // ------------------------------------------------------------------------
    // Pass 1

    fn line(&mut self, line: &str) {
        let mut fields = tokenizer::tokenize(line);

        while fields.first().map_or(false, |f| f.ends_with(':')) {
            let field = fields.remove(0);
            self.label(&field[..field.len() - 1]);
        }
        if fields.is_empty() {
            return;
        }

        if fields[0].starts_with('.') {
            self.directive(&fields);
        } else {
            match expand::expand(&fields) {
                Ok(insts) => {
                    for inst in insts {
                        self.push(inst);
                    }
                }
                Err(err) => self.errors.push(err),
            }
        }
    }

    fn label(&mut self, name: &str) {
        let address = if self.in_data {
            // data labels are word-indexed and pre-offset by the load base
            self.data.len() as u32 + self.data_start / 4
        } else {
            self.cursor
        };
        if self.labels.insert(name.to_string(), address).is_some() {
            self.errors.push(Error::RedefinedLabel(name.to_string()));
        }
    }

    fn push(&mut self, inst: Inst<Imm>) {
        if let Some(Imm::Label(label)) = inst.imm() {
            self.label_uses.insert(self.cursor, label.clone());
        }
        self.rows.insert(self.cursor, inst);
        self.cursor += 1;
    }

    fn directive(&mut self, fields: &[String]) {
        match fields[0].as_str() {
            ".text" => self.in_data = false,
            ".data" => self.in_data = true,
            ".word" => match fields.get(1) {
                Some(field) => match imm::parse_int(field) {
                    Ok(value) => self.data.extend_from_slice(&(value as u32).to_le_bytes()),
                    Err(_) => self
                        .errors
                        .push(Error::ParseArgument(field.clone(), "Int".to_string())),
                },
                None => self.errors.push(Error::MissingArgument),
            },
            ".string" => {
                let literal: String = fields[1..].concat();
                let mut bytes = literal.replace('"', "").into_bytes();
                while bytes.len() % 4 != 0 {
                    bytes.push(b'\0');
                }
                self.data.extend_from_slice(&bytes);
            }
            _ => self.errors.push(Error::UnknownDirective(fields[0].clone())),
        }
    }

    // ------------------------------------------------------------------------
    // Pass 2

    fn emit(&mut self) {
        let Assembler {
            rows,
            labels,
            text,
            errors,
            ..
        } = self;
        for (&row, inst) in rows.iter() {
            let word = match inst.resolve(row, |name| labels.get(name)) {
                Ok(inst) => inst.encode(),
                Err(label) => {
                    errors.push(Error::UndefinedLabel(label));
                    0
                }
            };
            text.extend_from_slice(&word.to_le_bytes());
        }
    }

    // ------------------------------------------------------------------------
    // Results

    pub fn text_segment(&self) -> &[u8] {
        &self.text
    }

    pub fn data_segment(&self) -> &[u8] {
        &self.data
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn symbols(&self) -> &Labels {
        &self.labels
    }

    pub fn rows(&self) -> &IndexMap<u32, Inst<Imm>> {
        &self.rows
    }

    pub fn label_uses(&self) -> &IndexMap<u32, String> {
        &self.label_uses
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ----------------------------------------------------------------------------
