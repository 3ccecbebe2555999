//! Reference solutions.
//!
//! Each solution recovers synthetic aborts with [`unwind::catch`], performs
//! the cleanup a deferred close would, and continues the unwind with
//! [`Unwind::resume`](errdare_sim::Unwind::resume).  Errors from closes are
//! folded into the result when no earlier error is pending.  All of them
//! pass under [`Config::RELAXED`](errdare_sim::Config::RELAXED).

use crate::cloud_storage::CloudStorage;
use crate::pipe_convert::PipeConvert;
use crate::tricky_catch::TrickyCatch;
use crate::value::{Close, CloseWithError, Token};
use errdare_sim::unwind;
use errdare_sim::Outcome;

pub fn cloud_storage(t: &CloudStorage) -> Outcome {
    let client = t.new_client()?;
    let res = unwind::catch(|| -> Outcome {
        let reader = t.new_reader()?;
        let res = unwind::catch(|| {
            let writer = t.new_writer(&client);
            match unwind::catch(|| t.copy(&writer, &reader).map(drop)) {
                Ok(copied) => {
                    let closed = writer.close_with_error(copied.as_ref().err());
                    copied.and(closed)
                }
                Err(u) => {
                    let _ = writer.close_with_error(u.abort());
                    u.resume()
                }
            }
        });
        match res {
            Ok(out) => {
                let closed = reader.close();
                out.and(closed)
            }
            Err(u) => {
                let _ = reader.close();
                u.resume()
            }
        }
    });
    // The client's close error is not ours to report.
    let _ = client.close();
    match res {
        Ok(out) => out,
        Err(u) => u.resume(),
    }
}

pub fn tricky_catch(t: &TrickyCatch) -> Outcome {
    let writer = t.new_writer()?;
    let res = unwind::catch(|| -> Outcome {
        let wrapper = t.new_wrapper(&writer)?;
        match unwind::catch(|| t.write_something(&wrapper)) {
            Ok(written) => {
                let closed = wrapper.close();
                written.and(closed)
            }
            Err(u) => {
                let _ = wrapper.close();
                u.resume()
            }
        }
    });
    match res {
        Ok(out) => {
            let closed = writer.close_with_error(out.as_ref().err());
            out.and(closed)
        }
        Err(u) => {
            let _ = writer.close_with_error(u.abort());
            u.resume()
        }
    }
}

pub fn pipe_convert(t: &PipeConvert, reader: Token) -> Outcome {
    let (pipe_reader, pipe_writer) = t.pipe();
    let producer = t.clone();
    t.spawn(move || {
        let res = unwind::catch(|| -> Outcome {
            let scanner = producer.new_scanner(&reader);
            while producer.scan(&scanner) {
                producer.write_scanned(&pipe_writer, &scanner)?;
            }
            producer.scan_err(&scanner)
        });
        let err = match &res {
            Ok(out) => out.as_ref().err().cloned(),
            Err(u) => u.abort().cloned(),
        };
        let _ = pipe_writer.close_with_error(err.as_ref());
        // The abort now travels through the pipe; anything else keeps unwinding.
        if let Err(u) = res {
            if u.abort().is_none() {
                u.resume();
            }
        }
    });
    t.wait(&pipe_reader)
}
