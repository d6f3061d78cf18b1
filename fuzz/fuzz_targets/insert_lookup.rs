#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use uct_table::config::TableConfig;
use uct_table::environment::Player;
use uct_table::tree::NodeTable;

// Every 10 bytes of input are one position: 8 bytes of hash, 1 byte of side
// to move and 1 byte of ply. A small table makes collisions and a full table
// likely.
fuzz_target!(|data: &[u8]| {
    let mut table = NodeTable::new(TableConfig::with_capacity(64)).unwrap();
    let mut inserted = vec![];
    for chunk in data.chunks_exact(10) {
        let key = u64::from_le_bytes(chunk[..8].try_into().unwrap());
        let side = if chunk[8] % 2 == 0 { Player::Black } else { Player::White };
        let ply = u16::from(chunk[9]);

        let before = table.used();
        let index = table.find_or_insert(key, side, ply);
        if table.is_valid(index) {
            inserted.push((key, side, ply, index));
            assert!(table.used() - before <= 1);
        } else {
            assert_eq!(table.used(), table.capacity());
        }
        assert!(table.usage_rate() <= 1.0);
    }
    for (key, side, ply, index) in inserted {
        assert_eq!(table.find_same_hash_index(key, side, ply), index);
    }
});
