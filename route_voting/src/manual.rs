/*!

This is the long-form manual for `route_voting` and `routevote`.

## Methods

### Instant-runoff voting

Each voter gives their vote to the highest ranked candidate still running.
If one candidate has strictly more than half of the votes, this candidate
wins. Otherwise one candidate is eliminated and the count starts again.

### Tideman alternative method

The Smith set is the smallest group of candidates that beat or tie every
candidate outside of the group in a head-to-head comparison (transitively).
If it holds a single candidate, that candidate wins. Otherwise, all the
candidates outside of the Smith set are removed, one more candidate is
eliminated with the rule below, and the process starts again.

### Elimination rule

Both methods eliminate candidates in the same way:
1. the candidate with the fewest first preferences is eliminated.
2. if several candidates are tied, the one with the lowest Copeland score
   (head-to-head wins minus head-to-head losses) is eliminated.
3. if they are still tied, a random draw decides. The draw is driven by a
   seed (`--seed`) so that a count can be replayed exactly. With
   `--strict-ties`, the count stops with an error instead.

## Input format

`routevote` reads the export of an online survey, as CSV (`csv`) or as an
Excel spreadsheet (`xlsx`). The first row holds the column headers and every
other row is one voter. Ranking questions are usually exported with one
column per candidate:

```text
Timestamp,Name,Rank the routes [north],Rank the routes [ridge],Rank the routes [coast]
2024-05-01,Ana,1,2,3
2024-05-01,Ben,2,1,3
```

- a column is a ranking column if its header starts with the text given with
  `--question`, or, by default, if it ends with a bracketed candidate name.
- the candidate name is the text in brackets, or what is left of the header
  once the question text is removed.
- a cell holds the rank given to this candidate. The first number in the cell
  is used, so `1`, `1st choice` and `Choice #1` are all understood.
- every voter must rank every candidate: the ranks start at 1 and have no
  gaps or repetitions. Rows that are entirely blank are skipped.

The column holding the name of the voter can be given with `--id-column`.

*/
