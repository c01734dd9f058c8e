/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt::Arguments;
use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;
use slog::{Drain, KV, OwnedKVList, Record, Serializer, slog_o};
use slog_scope::GlobalLoggerGuard;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// A synchronous drain writing one plain text line per record.
pub struct PlainDrain<W: Write> {
    io: Mutex<W>,
    append_code_position: bool,
}

impl<W: Write> PlainDrain<W> {
    pub fn new(io: W, append_code_position: bool) -> Self {
        PlainDrain {
            io: Mutex::new(io),
            append_code_position,
        }
    }

    fn write_plain(
        &self,
        buf: &mut Vec<u8>,
        record: &Record,
        kv_pairs: &[(String, String)],
    ) -> io::Result<()> {
        let datetime = Local::now();
        write!(buf, "{}", datetime.format(TIME_FORMAT))?;
        write!(buf, " {}", record.level())?;
        for (k, v) in kv_pairs {
            write!(buf, " {k}: {v},")?;
        }
        let msg = record.msg().to_string();
        if msg.is_empty() {
            write!(buf, " ()")?;
        } else {
            write!(buf, " {msg}")?;
        }
        if self.append_code_position {
            match record.file().rsplit_once('/').map(|x| x.1) {
                Some(filename) => {
                    write!(buf, " <{}({filename}:{})>", record.module(), record.line())?
                }
                None => write!(buf, " <{}>", record.module())?,
            }
        }
        writeln!(buf)
    }
}

impl<W: Write + Send> Drain for PlainDrain<W> {
    type Ok = ();
    type Err = slog::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), slog::Error> {
        let mut kv_pairs = Vec::new();
        let mut kv_formatter = FormatterKv(&mut kv_pairs);
        logger_values.serialize(record, &mut kv_formatter)?;
        record.kv().serialize(record, &mut kv_formatter)?;

        let mut buf: Vec<u8> = Vec::with_capacity(256);
        self.write_plain(&mut buf, record, &kv_pairs)?;

        let mut io = self.io.lock().unwrap_or_else(|e| e.into_inner());
        io.write_all(&buf)?;
        io.flush()?;
        Ok(())
    }
}

struct FormatterKv<'a>(&'a mut Vec<(String, String)>);

impl Serializer for FormatterKv<'_> {
    fn emit_arguments(&mut self, key: slog::Key, value: &Arguments) -> slog::Result {
        self.0.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

pub fn setup(verbose_level: u8) -> Result<GlobalLoggerGuard, log::SetLoggerError> {
    let drain = PlainDrain::new(io::stderr(), verbose_level > 2);
    let logger = slog::Logger::root(drain.fuse(), slog_o!());

    let scope_guard = slog_scope::set_global_logger(logger);

    let log_level = match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };

    slog_stdlog::init_with_level(log_level)?;
    Ok(scope_guard)
}
