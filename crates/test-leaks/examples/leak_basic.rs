// One 64-byte allocation with no matching free: teardown must report exactly
// one dangling entry with that size.

#[global_allocator]
static GLOBAL: leaktrail::TrackingAllocator = leaktrail::TrackingAllocator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let guard = leaktrail::GuardBuilder::new("leak_basic")
        .log_path(test_leaks::sink_path("leak_basic"))
        .build()?;

    let addr = test_leaks::leak_bytes(64);
    std::hint::black_box(addr);

    let freed = vec![1u8, 2, 3];
    drop(freed);

    drop(guard);
    Ok(())
}
