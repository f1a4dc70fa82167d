use criterion::{Criterion, Throughput};
use heapless::Vec as HVec;
use libfirebase::network::application::http::{Client, Header, Method, Request};
use libfirebase::network::error::Error;
use libfirebase::network::{Close, Connection, Read, Write};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

/// In-memory connection replaying a server transcript in random-sized reads.
struct ReplayConnection {
    incoming: Vec<u8>,
    read_pos: usize,
    reads: Vec<usize>,
    next_read: usize,
}

impl ReplayConnection {
    fn new(incoming: &[u8], rng: &mut StdRng) -> Self {
        let reads = (0..64).map(|_| rng.gen_range(1..=256)).collect();
        Self {
            incoming: incoming.to_vec(),
            read_pos: 0,
            reads,
            next_read: 0,
        }
    }
}

impl Read for ReplayConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let size = self.reads[self.next_read % self.reads.len()];
        self.next_read += 1;
        let remaining = &self.incoming[self.read_pos..];
        let len = buf.len().min(remaining.len()).min(size);
        buf[..len].copy_from_slice(&remaining[..len]);
        self.read_pos += len;
        Ok(len)
    }
}

impl Write for ReplayConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for ReplayConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for ReplayConnection {}

pub fn bench_read_stream_lines(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(17);
    let mut transcript = String::new();
    for i in 0..32 {
        transcript.push_str("event: patch\n");
        transcript.push_str(&format!(
            "data: {{\"path\":\"/devices/{}\",\"data\":{{\"level\":{}}}}}\n\n",
            i,
            rng.gen_range(0..1024)
        ));
    }

    let mut group = c.benchmark_group("http");
    group.throughput(Throughput::Bytes(transcript.len() as u64));
    group.bench_function("read_stream_lines", |b| {
        b.iter(|| {
            let mut client = Client::new(ReplayConnection::new(transcript.as_bytes(), &mut rng));
            while let Ok(line) = client.read_line(b'\n') {
                black_box(line);
            }
        })
    });
    group.finish();
}

pub fn bench_request_response(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(19);
    let response = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\n\r\n\
        10\r\n{\"temp\":21.5,\"hu\r\n9\r\nmidity\":4\r\n3\r\n0}\n\r\n0\r\n\r\n";

    c.bench_function("http/request_response", |b| {
        b.iter(|| {
            let mut headers = HVec::new();
            headers
                .push(Header::new("Host", "demo.firebaseio.com").unwrap())
                .unwrap();
            let request = Request {
                method: Method::Get,
                path: "/sensors/porch.json",
                headers,
                body: None,
            };
            let mut client = Client::new(ReplayConnection::new(response, &mut rng));
            black_box(client.request(&request).unwrap())
        })
    });
}
