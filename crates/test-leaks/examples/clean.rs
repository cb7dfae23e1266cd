// A session where every allocation is freed: teardown must report
// "No dangling pointers logged".

#[global_allocator]
static GLOBAL: leaktrail::TrackingAllocator = leaktrail::TrackingAllocator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let guard = leaktrail::GuardBuilder::new("clean")
        .log_path(test_leaks::sink_path("clean"))
        .build()?;

    let data = vec![7u8; 4096];
    let sum: u64 = data.iter().map(|&b| u64::from(b)).sum();
    std::hint::black_box(sum);
    drop(data);

    drop(guard);
    Ok(())
}
