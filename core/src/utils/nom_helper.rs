/**
 * Security descriptor structures are fixed width little endian fields stitched together with offsets
 * With nom we can read a field in two steps, ex:
 *   `take X bytes`
 *   `le_uX` to number
 *
 * These functions help reduce the repetitiveness of converting bytes to a number
 */
use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u32, be_u8, le_u16, le_u32, le_u8},
};
use std::mem::size_of;

pub(crate) enum Endian {
    /**Little Endian */
    Le,
    /**Big Endian */
    Be,
}

/**
 * Nom four (4) bytes to u32
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_four_bytes(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u32> {
    let (input, value_data) = take(size_of::<u32>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u32(value_data)?,
        Endian::Be => be_u32(value_data)?,
    };

    Ok((input, value))
}

/**
 * Nom two (2) bytes to u16
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_two_bytes(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u16> {
    let (input, value_data) = take(size_of::<u16>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u16(value_data)?,
        Endian::Be => be_u16(value_data)?,
    };
    Ok((input, value))
}

/**
 * Nom one (1) bytes to u8
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_one_byte(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u8> {
    let (input, value_data) = take(size_of::<u8>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u8(value_data)?,
        Endian::Be => be_u8(value_data)?,
    };
    Ok((input, value))
}

/**
 * Nom an arbitrary amount of data and return the bytes remaining and bytes nom'd
 */
pub(crate) fn nom_data(data: &[u8], count: u64) -> nom::IResult<&[u8], &[u8]> {
    let (input, value) = take(count)(data)?;

    Ok((input, value))
}

#[cfg(test)]
mod tests {
    use crate::utils::nom_helper::{
        nom_data, nom_unsigned_four_bytes, nom_unsigned_one_byte, nom_unsigned_two_bytes, Endian,
    };

    #[test]
    fn test_nom_data() {
        let test = [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let (remaining, results) = nom_data(&test, 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(remaining.len(), 13);
    }

    #[test]
    fn test_nom_data_short() {
        let test = [2, 0];
        assert!(nom_data(&test, 3).is_err());
    }

    #[test]
    fn test_nom_unsigned_four_bytes() {
        let test = [0, 0, 0, 2];
        let (_, results) = nom_unsigned_four_bytes(&test, Endian::Be).unwrap();
        assert_eq!(results, 2);

        let test = [0xff, 0x01, 0x0f, 0];
        let (_, results) = nom_unsigned_four_bytes(&test, Endian::Le).unwrap();
        assert_eq!(results, 0xf01ff);
    }

    #[test]
    fn test_nom_unsigned_two_bytes() {
        let test = [20, 140];
        let (_, results) = nom_unsigned_two_bytes(&test, Endian::Le).unwrap();
        assert_eq!(results, 0x8c14);
    }

    #[test]
    fn test_nom_unsigned_one_byte() {
        let test = [5, 1];
        let (remaining, results) = nom_unsigned_one_byte(&test, Endian::Le).unwrap();
        assert_eq!(results, 5);
        assert_eq!(remaining, [1]);
    }
}
