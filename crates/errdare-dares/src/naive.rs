//! The simplistic solutions each dare warns about.
//!
//! They read naturally and handle the common error paths, yet each one
//! fails under hard policy: the cloud storage solution drops the reader's
//! close error, the tricky catch solution drops the wrapper's close error,
//! and the pipe conversion solution lets an abort kill its producer.

use crate::cloud_storage::CloudStorage;
use crate::pipe_convert::PipeConvert;
use crate::tricky_catch::TrickyCatch;
use crate::value::{Close, CloseWithError, Token};
use errdare_sim::Outcome;

pub fn cloud_storage(t: &CloudStorage) -> Outcome {
    let client = t.new_client()?;
    let reader = match t.new_reader() {
        Ok(reader) => reader,
        Err(err) => {
            let _ = client.close();
            return Err(err);
        }
    };
    let writer = t.new_writer(&client);
    let res = t.copy(&writer, &reader).map(drop);
    let _ = writer.close_with_error(res.as_ref().err());
    let _ = reader.close();
    let _ = client.close();
    res
}

pub fn tricky_catch(t: &TrickyCatch) -> Outcome {
    let writer = t.new_writer()?;
    let wrapper = match t.new_wrapper(&writer) {
        Ok(wrapper) => wrapper,
        Err(err) => {
            let _ = writer.close_with_error(Some(&err));
            return Err(err);
        }
    };
    let res = t.write_something(&wrapper);
    let _ = wrapper.close();
    let _ = writer.close_with_error(res.as_ref().err());
    res
}

pub fn pipe_convert(t: &PipeConvert, reader: Token) -> Outcome {
    let (pipe_reader, pipe_writer) = t.pipe();
    let producer = t.clone();
    t.spawn(move || {
        let scanner = producer.new_scanner(&reader);
        let mut res = Ok(());
        while producer.scan(&scanner) {
            res = producer.write_scanned(&pipe_writer, &scanner);
            if res.is_err() {
                break;
            }
        }
        if res.is_ok() {
            res = producer.scan_err(&scanner);
        }
        let _ = pipe_writer.close_with_error(res.as_ref().err());
    });
    t.wait(&pipe_reader)
}
