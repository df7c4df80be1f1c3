use chrono::{DateTime, Utc};
use egts::subrecord::{
    AbsCntr, AbsDigSens, AbsLoopin, AccelData, AccelMeasurement, AdSensors, AuthInfo,
    CountersData, DispatcherIdentity, LoopinData, ModuleData, PlusData, StateData, TermIdentity,
};
use egts::{
    from_egts_seconds, Body, CodecOptions, Counters, Frames, Packet, Priority, RecordSet,
    ResultCode, ServiceDataRecord, ServiceDataSet, ServiceType, Subrecord,
};
use proptest::prelude::*;

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    any::<u32>().prop_filter_map("representable", from_egts_seconds)
}

fn digits(len: usize) -> impl Strategy<Value = String> {
    proptest::string::string_regex(&format!("[0-9]{{{len}}}")).unwrap()
}

fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ._-]{0,24}"
}

fn optional_u24() -> impl Strategy<Value = Option<u32>> {
    proptest::option::of(0u32..=0x00FF_FFFF)
}

fn term_identity() -> impl Strategy<Value = TermIdentity> {
    (
        any::<u32>(),
        any::<bool>(),
        proptest::option::of(any::<u16>()),
        proptest::option::of(digits(15)),
        proptest::option::of(digits(16)),
        proptest::option::of("[a-z]{3}"),
        proptest::option::of(any::<[u8; 3]>()),
        proptest::option::of(any::<u16>()),
        proptest::option::of(digits(15)),
    )
        .prop_map(
            |(
                terminal_id,
                simple_auth,
                home_dispatcher_id,
                imei,
                imsi,
                language_code,
                network_id,
                buffer_size,
                msisdn,
            )| TermIdentity {
                terminal_id,
                simple_auth,
                home_dispatcher_id,
                imei,
                imsi,
                language_code,
                network_id,
                buffer_size,
                msisdn,
            },
        )
}

fn subrecord() -> impl Strategy<Value = Subrecord> {
    prop_oneof![
        term_identity().prop_map(Subrecord::TermIdentity),
        (any::<u8>(), any::<u32>(), any::<u16>(), text(), text()).prop_map(
            |(module_type, vendor_id, firmware_version, serial_number, description)| {
                Subrecord::ModuleData(ModuleData {
                    module_type,
                    vendor_id,
                    firmware_version,
                    serial_number,
                    description,
                    ..ModuleData::default()
                })
            }
        ),
        (any::<u8>(), any::<u32>(), text()).prop_map(
            |(dispatcher_type, dispatcher_id, description)| {
                Subrecord::DispatcherIdentity(DispatcherIdentity {
                    dispatcher_type,
                    dispatcher_id,
                    description,
                })
            }
        ),
        (text(), text(), proptest::option::of(text())).prop_map(
            |(user_name, user_password, server_sequence)| {
                Subrecord::AuthInfo(AuthInfo {
                    user_name,
                    user_password,
                    server_sequence,
                })
            }
        ),
        proptest::collection::vec(any::<u8>(), 0..64)
            .prop_map(|data| Subrecord::PlusData(PlusData { data })),
        (
            proptest::array::uniform8(proptest::option::of(any::<u8>())),
            any::<u8>(),
            proptest::array::uniform8(optional_u24()),
        )
            .prop_map(|(digital_inputs, digital_outputs, analog_sensors)| {
                Subrecord::AdSensors(AdSensors {
                    digital_inputs,
                    digital_outputs,
                    analog_sensors,
                })
            }),
        proptest::array::uniform8(optional_u24())
            .prop_map(|counters| Subrecord::Counters(CountersData { counters })),
        // Empty accelerometer reports have no wire form.
        (
            timestamp(),
            proptest::collection::vec(any::<(u16, i16, i16, i16)>(), 1..8)
        )
            .prop_map(|(absolute_time, samples)| {
                Subrecord::AccelData(AccelData {
                    absolute_time,
                    measurements: samples
                        .into_iter()
                        .map(|(relative_time, x, y, z)| AccelMeasurement {
                            relative_time,
                            x,
                            y,
                            z,
                        })
                        .collect(),
                })
            }),
        (any::<[u8; 4]>(), any::<[bool; 3]>()).prop_map(|(levels, flags)| {
            Subrecord::StateData(StateData {
                state: levels[0],
                main_power_voltage: levels[1],
                backup_battery_voltage: levels[2],
                internal_battery_voltage: levels[3],
                navigation_enabled: flags[0],
                internal_battery_used: flags[1],
                backup_battery_used: flags[2],
            })
        }),
        proptest::array::uniform8(proptest::option::of(0u8..16))
            .prop_map(|states| Subrecord::LoopinData(LoopinData { states })),
        (0u16..4096, 0u8..16)
            .prop_map(|(number, state)| Subrecord::AbsDigSens(AbsDigSens { number, state })),
        (any::<u8>(), 0u32..=0x00FF_FFFF)
            .prop_map(|(number, value)| Subrecord::AbsCntr(AbsCntr { number, value })),
        (0u16..4096, 0u8..16)
            .prop_map(|(number, state)| Subrecord::AbsLoopin(AbsLoopin { number, state })),
    ]
}

fn service_record() -> impl Strategy<Value = ServiceDataRecord> {
    (
        any::<u16>(),
        any::<(bool, bool, bool)>(),
        0u8..4,
        proptest::option::of(any::<u32>()),
        proptest::option::of(any::<u32>()),
        proptest::option::of(timestamp()),
        any::<(u8, u8)>(),
        proptest::collection::vec(subrecord(), 0..6),
    )
        .prop_map(
            |(number, (ssod, rsod, group), priority, object_id, event_id, time, services, subs)| {
                ServiceDataRecord {
                    source_on_device: ssod,
                    recipient_on_device: rsod,
                    group,
                    priority: Priority::from_bits(priority),
                    object_id,
                    event_id,
                    time,
                    ..ServiceDataRecord::new(
                        number,
                        ServiceType::from_raw(services.0),
                        ServiceType::from_raw(services.1),
                        RecordSet::from(subs),
                    )
                }
            },
        )
}

proptest! {
    #[test]
    fn prop_subrecord_roundtrip(sub in subrecord()) {
        let payload = sub.encode().unwrap();
        let decoded = Subrecord::decode(sub.subrecord_type().raw(), &payload).unwrap();
        prop_assert_eq!(decoded, sub);
    }

    // An empty body encodes as a header-only frame, which decodes with no body.
    #[test]
    fn prop_packet_roundtrip(
        packet_id in any::<u16>(),
        records in proptest::collection::vec(service_record(), 1..4),
    ) {
        let options = CodecOptions::default();
        let packet = Packet::app_data(packet_id, ServiceDataSet::from(records));
        let bytes = packet.encode(&options).unwrap();
        prop_assert_eq!(Packet::decode(&bytes, &options).unwrap(), packet);
    }

    #[test]
    fn prop_response_acknowledges_every_record(
        packet_id in any::<u16>(),
        records in proptest::collection::vec(service_record(), 1..4),
    ) {
        let options = CodecOptions::default();
        let packet = Packet::app_data(packet_id, ServiceDataSet::from(records));
        let bytes = packet.response(&Counters::new()).unwrap();

        let mut frames = Frames::new(&bytes);
        let reply = Packet::decode(frames.next().unwrap().unwrap(), &options).unwrap();
        let acks = reply.service_records();
        prop_assert_eq!(acks.len(), packet.service_records().len());
        for (ack, record) in acks.iter().zip(packet.service_records()) {
            let confirmed = match ack.records.as_slice() {
                [Subrecord::Response(response)] => response.confirmed_record_number,
                other => panic!("unexpected acknowledgement {other:?}"),
            };
            prop_assert_eq!(confirmed, record.record_number);
            prop_assert_eq!(ack.recipient_service, record.source_service);
        }

        let identified = packet
            .service_records()
            .iter()
            .any(|record| record.records.has_identification());
        prop_assert_eq!(frames.next().is_some(), identified);
        match &reply.body {
            Some(Body::Response(response)) => {
                prop_assert_eq!(response.response_packet_id, packet_id);
                prop_assert_eq!(response.processing_result, ResultCode::OK);
            }
            other => panic!("unexpected reply body {other:?}"),
        }
    }

    #[test]
    fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = Packet::decode(&bytes, &CodecOptions::default());
        for frame in Frames::new(&bytes).flatten() {
            let _ = Packet::decode(frame, &CodecOptions::default());
        }
    }
}
