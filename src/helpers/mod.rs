mod amounts;
mod enums;
mod time_bucket;

pub use self::{
    amounts::{parse_raw_amount, to_display_amount, DEFAULT_DECIMALS},
    enums::{EventsType, MetricProfile, StoreKind},
    time_bucket::{
        block_time, bucket_index, bucket_key, SnapshotPeriod, SECONDS_PER_DAY,
        SECONDS_PER_HOUR,
    },
};

pub fn parse_tuple_string(data: String) -> Vec<String> {
    let Some(str) = data.get(1..) else {
        return Vec::new();
    };
    let splited = str.split(",(");
    let mut items: Vec<String> = Vec::new();

    for c in splited {
        if let Some(index) = c.find(')') {
            let tuple_data = &c[0..index];
            items.push(tuple_data.to_owned());
        }
    }

    items
}
