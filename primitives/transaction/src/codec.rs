use std::io::{Cursor, Read};

use blake2::digest::{consts::U32, Digest};
use blake2::Blake2b;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use ms_primitives::{Address, Coin};

use crate::attachment::{Attachment, MintingAlgorithm};
use crate::error::TransactionError;
use crate::transaction::{EcBlock, Transaction};

type Blake2b256 = Blake2b<U32>;

/// Derives a transaction id from its canonical bytes by hashing them and
/// taking the first 8 bytes, big-endian (spec §3: "`id` is derived from
/// [bytes]"). Grounded on the teacher's `tx.hash::<Blake2bHash>()`
/// idiom, narrowed to a 64-bit id the way spec §3 specifies.
pub fn derive_id(bytes: &[u8]) -> u64 {
    let digest = Blake2b256::digest(bytes);
    u64::from_be_bytes(digest[0..8].try_into().unwrap())
}

#[allow(clippy::too_many_arguments)]
pub fn encode(
    sender: Address,
    recipient: Address,
    amount: Coin,
    fee: Coin,
    timestamp: i64,
    deadline: u32,
    version: u8,
    ec_block: Option<EcBlock>,
    attachment: &Attachment,
    signature: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u64::<BigEndian>(sender.as_u64()).unwrap();
    buf.write_u64::<BigEndian>(recipient.as_u64()).unwrap();
    buf.write_u64::<BigEndian>(amount.as_u64()).unwrap();
    buf.write_u64::<BigEndian>(fee.as_u64()).unwrap();
    buf.write_i64::<BigEndian>(timestamp).unwrap();
    buf.write_u32::<BigEndian>(deadline).unwrap();
    buf.write_u8(version).unwrap();

    match ec_block {
        Some(ec) => {
            buf.write_u8(1).unwrap();
            buf.write_u32::<BigEndian>(ec.height).unwrap();
            buf.write_u64::<BigEndian>(ec.id).unwrap();
        }
        None => buf.write_u8(0).unwrap(),
    }

    encode_attachment(&mut buf, attachment);

    buf.write_u16::<BigEndian>(signature.len() as u16).unwrap();
    buf.extend_from_slice(signature);

    buf
}

fn write_str(buf: &mut Vec<u8>, s: &str, len_bytes: usize) {
    let bytes = s.as_bytes();
    match len_bytes {
        1 => buf.write_u8(bytes.len() as u8).unwrap(),
        2 => buf.write_u16::<BigEndian>(bytes.len() as u16).unwrap(),
        _ => unreachable!("unsupported length prefix width"),
    }
    buf.extend_from_slice(bytes);
}

fn encode_attachment(buf: &mut Vec<u8>, attachment: &Attachment) {
    match attachment {
        Attachment::Ordinary => buf.write_u8(0).unwrap(),
        Attachment::Issuance {
            currency_type,
            name,
            code,
            description,
            issuance_height,
            current_supply,
            min_difficulty,
            max_difficulty,
            algorithm,
        } => {
            buf.write_u8(1).unwrap();
            buf.write_u32::<BigEndian>(currency_type.bits()).unwrap();
            write_str(buf, name, 1);
            write_str(buf, code, 1);
            write_str(buf, description, 2);
            buf.write_u32::<BigEndian>(*issuance_height).unwrap();
            buf.write_u64::<BigEndian>(*current_supply).unwrap();
            buf.write_u8(*min_difficulty).unwrap();
            buf.write_u8(*max_difficulty).unwrap();
            let algo_byte = match algorithm {
                MintingAlgorithm::Sha256 => 2,
                MintingAlgorithm::Scrypt => 3,
                MintingAlgorithm::Unknown(v) => *v,
            };
            buf.write_u8(algo_byte).unwrap();
        }
        Attachment::Transfer { currency_id, units } => {
            buf.write_u8(2).unwrap();
            buf.write_u64::<BigEndian>(*currency_id).unwrap();
            buf.write_u64::<BigEndian>(*units).unwrap();
        }
        Attachment::PublishExchangeOffer { currency_id } => {
            buf.write_u8(3).unwrap();
            buf.write_u64::<BigEndian>(*currency_id).unwrap();
        }
        Attachment::ExchangeBuy { currency_id } => {
            buf.write_u8(4).unwrap();
            buf.write_u64::<BigEndian>(*currency_id).unwrap();
        }
        Attachment::ExchangeSell { currency_id } => {
            buf.write_u8(5).unwrap();
            buf.write_u64::<BigEndian>(*currency_id).unwrap();
        }
        Attachment::ReserveIncrease {
            currency_id,
            amount_per_unit,
        } => {
            buf.write_u8(6).unwrap();
            buf.write_u64::<BigEndian>(*currency_id).unwrap();
            buf.write_u64::<BigEndian>(*amount_per_unit).unwrap();
        }
        Attachment::ReserveClaim { currency_id, units } => {
            buf.write_u8(7).unwrap();
            buf.write_u64::<BigEndian>(*currency_id).unwrap();
            buf.write_u64::<BigEndian>(*units).unwrap();
        }
        Attachment::Minting {
            currency_id,
            nonce,
            counter,
        } => {
            buf.write_u8(8).unwrap();
            buf.write_u64::<BigEndian>(*currency_id).unwrap();
            buf.write_u64::<BigEndian>(*nonce).unwrap();
            buf.write_u32::<BigEndian>(*counter).unwrap();
        }
    }
}

fn read_str(cursor: &mut Cursor<&[u8]>, len_bytes: usize) -> Result<String, TransactionError> {
    let len = match len_bytes {
        1 => cursor
            .read_u8()
            .map_err(|_| TransactionError::Truncated)? as usize,
        2 => cursor
            .read_u16::<BigEndian>()
            .map_err(|_| TransactionError::Truncated)? as usize,
        _ => unreachable!("unsupported length prefix width"),
    };
    let mut data = vec![0u8; len];
    cursor
        .read_exact(&mut data)
        .map_err(|_| TransactionError::Truncated)?;
    String::from_utf8(data).map_err(|_| TransactionError::Truncated)
}

fn decode_attachment(cursor: &mut Cursor<&[u8]>) -> Result<Attachment, TransactionError> {
    let discriminant = cursor.read_u8().map_err(|_| TransactionError::Truncated)?;
    let attachment = match discriminant {
        0 => Attachment::Ordinary,
        1 => {
            let currency_type_bits = cursor
                .read_u32::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?;
            let currency_type =
                crate::capability::CapabilityFlags::from_bits_truncate(currency_type_bits);
            let name = read_str(cursor, 1)?;
            let code = read_str(cursor, 1)?;
            let description = read_str(cursor, 2)?;
            let issuance_height = cursor
                .read_u32::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?;
            let current_supply = cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?;
            let min_difficulty = cursor.read_u8().map_err(|_| TransactionError::Truncated)?;
            let max_difficulty = cursor.read_u8().map_err(|_| TransactionError::Truncated)?;
            let algorithm = MintingAlgorithm::from_wire(
                cursor.read_u8().map_err(|_| TransactionError::Truncated)?,
            );
            Attachment::Issuance {
                currency_type,
                name,
                code,
                description,
                issuance_height,
                current_supply,
                min_difficulty,
                max_difficulty,
                algorithm,
            }
        }
        2 => Attachment::Transfer {
            currency_id: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
            units: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
        },
        3 => Attachment::PublishExchangeOffer {
            currency_id: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
        },
        4 => Attachment::ExchangeBuy {
            currency_id: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
        },
        5 => Attachment::ExchangeSell {
            currency_id: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
        },
        6 => Attachment::ReserveIncrease {
            currency_id: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
            amount_per_unit: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
        },
        7 => Attachment::ReserveClaim {
            currency_id: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
            units: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
        },
        8 => Attachment::Minting {
            currency_id: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
            nonce: cursor
                .read_u64::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
            counter: cursor
                .read_u32::<BigEndian>()
                .map_err(|_| TransactionError::Truncated)?,
        },
        other => return Err(TransactionError::UnknownAttachment(other)),
    };
    Ok(attachment)
}

pub fn decode(bytes: &[u8]) -> Result<Transaction, TransactionError> {
    let mut cursor = Cursor::new(bytes);

    let sender = Address::from_u64(
        cursor
            .read_u64::<BigEndian>()
            .map_err(|_| TransactionError::Truncated)?,
    );
    let recipient = Address::from_u64(
        cursor
            .read_u64::<BigEndian>()
            .map_err(|_| TransactionError::Truncated)?,
    );
    let amount = Coin::from_u64(
        cursor
            .read_u64::<BigEndian>()
            .map_err(|_| TransactionError::Truncated)?,
    );
    let fee = Coin::from_u64(
        cursor
            .read_u64::<BigEndian>()
            .map_err(|_| TransactionError::Truncated)?,
    );
    let timestamp = cursor
        .read_i64::<BigEndian>()
        .map_err(|_| TransactionError::Truncated)?;
    let deadline = cursor
        .read_u32::<BigEndian>()
        .map_err(|_| TransactionError::Truncated)?;
    let version = cursor.read_u8().map_err(|_| TransactionError::Truncated)?;

    let has_ec_block = cursor.read_u8().map_err(|_| TransactionError::Truncated)?;
    let ec_block = if has_ec_block == 1 {
        let height = cursor
            .read_u32::<BigEndian>()
            .map_err(|_| TransactionError::Truncated)?;
        let id = cursor
            .read_u64::<BigEndian>()
            .map_err(|_| TransactionError::Truncated)?;
        Some(EcBlock { height, id })
    } else {
        None
    };

    let attachment = decode_attachment(&mut cursor)?;

    let sig_len = cursor
        .read_u16::<BigEndian>()
        .map_err(|_| TransactionError::Truncated)? as usize;
    let mut signature = vec![0u8; sig_len];
    cursor
        .read_exact(&mut signature)
        .map_err(|_| TransactionError::Truncated)?;

    if cursor.position() as usize != bytes.len() {
        return Err(TransactionError::TrailingBytes);
    }

    let id = derive_id(bytes);

    Ok(Transaction {
        id,
        sender,
        recipient,
        amount,
        fee,
        timestamp,
        deadline,
        version,
        ec_block,
        attachment,
        signature,
        bytes: bytes.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::Attachment;

    #[test]
    fn round_trips_ordinary_transaction() {
        let bytes = encode(
            Address::from_u64(1),
            Address::from_u64(2),
            Coin::from_u64(100),
            Coin::from_u64(1),
            1_700_000_000,
            60,
            1,
            Some(EcBlock { height: 10, id: 42 }),
            &Attachment::Ordinary,
            &[1, 2, 3, 4],
        );

        let tx = decode(&bytes).expect("decodes");
        assert_eq!(tx.sender, Address::from_u64(1));
        assert_eq!(tx.recipient, Address::from_u64(2));
        assert_eq!(tx.amount, Coin::from_u64(100));
        assert_eq!(tx.fee, Coin::from_u64(1));
        assert_eq!(tx.deadline, 60);
        assert_eq!(tx.ec_block, Some(EcBlock { height: 10, id: 42 }));
        assert_eq!(tx.attachment, Attachment::Ordinary);
        assert_eq!(tx.signature, vec![1, 2, 3, 4]);
        assert_eq!(tx.id, derive_id(&bytes));

        let reencoded = encode(
            tx.sender,
            tx.recipient,
            tx.amount,
            tx.fee,
            tx.timestamp,
            tx.deadline,
            tx.version,
            tx.ec_block,
            &tx.attachment,
            &tx.signature,
        );
        assert_eq!(reencoded, bytes);
    }

    #[test]
    fn id_is_stable_across_reencoding() {
        let tx = Transaction::build(
            Address::from_u64(7),
            Address::from_u64(8),
            Coin::from_u64(0),
            Coin::from_u64(5),
            1_700_000_000,
            10,
            1,
            None,
            Attachment::ReserveIncrease {
                currency_id: 99,
                amount_per_unit: 3,
            },
            vec![9, 9, 9],
        );
        let reparsed = Transaction::parse(&tx.bytes).expect("reparses");
        assert_eq!(reparsed.id, tx.id);
        assert_eq!(reparsed, tx);
    }

    #[test]
    fn rejects_truncated_bytes() {
        let bytes = vec![0u8; 3];
        assert_eq!(decode(&bytes), Err(TransactionError::Truncated));
    }
}
