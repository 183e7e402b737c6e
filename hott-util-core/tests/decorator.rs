use hott_util_core::callback::Callback;
use hott_util_core::stream::{is_cancellation, CallbackReader, CallbackWriter};
use hott_util_core::Error;
use std::cell::{Cell, RefCell};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Records every progress report and counts cancellation checks.
#[derive(Default)]
struct Recorder {
    reports: RefCell<Vec<(u64, u64)>>,
    checks: Cell<u64>,
    cancelled: Cell<bool>,
}

impl Callback for Recorder {
    fn update_message(&self, _message: &str) {}

    fn update_progress(&self, done: u64, total: u64) {
        self.reports.borrow_mut().push((done, total));
    }

    fn update_sub_progress(&self, _done: u64, _total: u64) {}

    fn is_cancelled(&self) -> bool {
        self.checks.set(self.checks.get() + 1);
        self.cancelled.get()
    }

    fn cancel(&self) -> bool {
        self.cancelled.set(true);
        true
    }

    fn warning(&self, _: &str, _: &str, _: Option<&[&str]>, _: usize) -> bool {
        true
    }

    fn confirm(&self, _: &str, _: &str, _: Option<&[&str]>, _: usize) -> bool {
        true
    }
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_reading_2050_bytes_reports_three_times() {
    let data = pattern(2050);
    let callback = Recorder::default();
    let mut reader = CallbackReader::new(Some(&callback), Cursor::new(&data), Some(2050));

    let mut buf = vec![0u8; 2050];
    reader.read_exact(&mut buf).unwrap();

    assert_eq!(buf, data);
    assert_eq!(reader.count(), 2050);
    assert_eq!(
        *callback.reports.borrow(),
        vec![(0, 2050), (1024, 2050), (2048, 2050)]
    );
}

#[test]
fn test_writing_reports_at_every_kib() {
    let data = pattern(5000);
    let callback = Recorder::default();
    let mut writer = CallbackWriter::new(Some(&callback), Vec::new(), Some(5000));

    writer.write_all(&data).unwrap();

    let counters: Vec<u64> = callback.reports.borrow().iter().map(|&(done, _)| done).collect();
    assert_eq!(counters, vec![0, 1024, 2048, 3072, 4096]);
    assert_eq!(writer.into_inner(), data);
}

#[test]
fn test_unknown_total_never_reports_but_still_checks() {
    let data = pattern(3000);
    let callback = Recorder::default();
    let mut writer = CallbackWriter::new(Some(&callback), Vec::new(), None);

    writer.write_all(&data).unwrap();

    assert!(callback.reports.borrow().is_empty());
    assert_eq!(callback.checks.get(), 3000);
}

#[test]
fn test_write_cancelled_after_500_bytes() {
    let callback = Recorder::default();
    let mut sink = Vec::new();
    let mut writer = CallbackWriter::new(Some(&callback), &mut sink, Some(1000));

    writer.write_all(&pattern(500)).unwrap();
    callback.cancel();

    let err = writer.write_byte(0xaa).unwrap_err();
    assert!(is_cancellation(&err));
    assert!(matches!(Error::from(err), Error::Cancelled));

    let err = writer.write_all(&[1, 2, 3]).unwrap_err();
    assert!(is_cancellation(&err));

    drop(writer);
    assert_eq!(sink.len(), 500);
}

#[test]
fn test_read_cancelled_after_500_bytes() {
    let data = pattern(1000);
    let callback = Recorder::default();
    let mut reader = CallbackReader::new(Some(&callback), Cursor::new(&data), Some(1000));

    let mut head = vec![0u8; 500];
    reader.read_exact(&mut head).unwrap();
    callback.cancel();

    let err = reader.read_byte().unwrap_err();
    assert!(is_cancellation(&err));
    assert_eq!(reader.get_ref().position(), 500);

    let mut rest = Vec::new();
    let err = reader.read_to_end(&mut rest).unwrap_err();
    assert!(is_cancellation(&err));
    assert!(rest.is_empty());
}

#[test]
fn test_cancellation_before_first_byte() {
    let callback = Recorder::default();
    callback.cancel();

    let mut reader = CallbackReader::new(Some(&callback), Cursor::new(pattern(10)), Some(10));
    let mut buf = [0u8; 4];
    let err = reader.read(&mut buf).unwrap_err();

    assert!(is_cancellation(&err));
    assert_eq!(reader.count(), 0);
    assert!(callback.reports.borrow().is_empty());
}

#[test]
fn test_end_of_stream_is_passed_through() {
    let callback = Recorder::default();
    let mut reader = CallbackReader::new(Some(&callback), Cursor::new(Vec::<u8>::new()), Some(1));

    assert_eq!(reader.read_byte().unwrap(), None);
    // The check and the first report still happened.
    assert_eq!(*callback.reports.borrow(), vec![(0, 1)]);
}

#[test]
fn test_inner_read_error_is_not_a_cancellation() {
    struct Failing;
    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad sector"))
        }
    }

    let callback = Recorder::default();
    let mut reader = CallbackReader::new(Some(&callback), Failing, None);
    let err = reader.read_byte().unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(!is_cancellation(&err));
    assert!(matches!(Error::from(err), Error::Io(_)));
}

#[test]
fn test_file_backed_round_trip_through_both_decorators() {
    let data = pattern(3000);
    let callback = Recorder::default();

    let mut file = tempfile::tempfile().expect("Failed to create temp file");
    {
        let mut writer = CallbackWriter::new(Some(&callback), &mut file, Some(3000));
        writer.write_all(&data).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.count(), 3000);
    }

    file.seek(SeekFrom::Start(0)).unwrap();
    let len = file.metadata().unwrap().len();
    assert_eq!(len, 3000);

    let mut reader = CallbackReader::new(Some(&callback), io::BufReader::new(&file), Some(len));
    let mut back = vec![0u8; 3000];
    reader.read_exact(&mut back).unwrap();

    assert_eq!(back, data);
    // 0, 1024 and 2048 from the write, then the same three from the read.
    assert_eq!(callback.reports.borrow().len(), 6);
}
